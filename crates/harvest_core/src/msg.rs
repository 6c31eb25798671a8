#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin the run at the state's starting batch.
    Start,
    /// The pager delivered a page for the window currently being fetched.
    PageFetched(crate::Page),
    /// The writer persisted the batch with this index.
    BatchFlushed { batch_index: usize },
    /// Fatal failure or external stop; the in-progress batch is discarded.
    Abort,
}
