use crate::{Batch, BatchError, PlannedWindow};

/// Side effects requested by [`crate::update`], executed in order by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch one complete page for the window.
    FetchWindow(PlannedWindow),
    /// Sleep the inter-request delay.
    Pace,
    /// Persist a full batch under its index.
    FlushBatch { batch_index: usize, batch: Batch },
    /// Every planned batch has been flushed.
    Finish,
    /// A page could not be accepted into the batch; the run is over.
    Reject(BatchError),
}
