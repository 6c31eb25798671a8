use crate::{Effect, HarvestState, Msg, RunPhase};

/// Pure update function: applies a message to state and returns any effects.
///
/// Per batch the run moves `Fetching -> (append page) -> Fetching | Flushing`,
/// and after a flush on to the next batch's first window or `Finished`.
/// Every accepted page is followed by exactly one `Pace`; a full batch is
/// flushed before that pause so a stop during it never loses a whole batch.
pub fn update(mut state: HarvestState, msg: Msg) -> (HarvestState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start => {
            if state.phase() != RunPhase::Idle {
                return (state, Vec::new());
            }
            let start_batch = state.start_batch();
            begin_batch(&mut state, start_batch)
        }
        Msg::PageFetched(page) => {
            let RunPhase::Fetching {
                batch_index,
                page_index,
            } = state.phase()
            else {
                return (state, Vec::new());
            };

            if let Err(err) = state.accumulator_mut().append(page) {
                state.accumulator_mut().drain();
                state.set_phase(RunPhase::Aborted);
                return (state, vec![Effect::Reject(err)]);
            }
            state.record_page();

            if state.accumulator_mut().is_full() {
                state.set_phase(RunPhase::Flushing { batch_index });
                let batch = state.accumulator_mut().drain();
                vec![Effect::FlushBatch { batch_index, batch }, Effect::Pace]
            } else {
                let page_index = page_index + 1;
                state.set_phase(RunPhase::Fetching {
                    batch_index,
                    page_index,
                });
                let next = state.current_window();
                let mut effects = vec![Effect::Pace];
                effects.extend(next.map(Effect::FetchWindow));
                effects
            }
        }
        Msg::BatchFlushed { batch_index } => {
            if state.phase() != (RunPhase::Flushing { batch_index }) {
                return (state, Vec::new());
            }
            state.record_flush(batch_index);
            begin_batch(&mut state, batch_index + 1)
        }
        Msg::Abort => {
            if !state.phase().is_terminal() {
                // The partial batch is dropped, never flushed.
                state.accumulator_mut().drain();
                state.set_phase(RunPhase::Aborted);
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn begin_batch(state: &mut HarvestState, batch_index: usize) -> Vec<Effect> {
    if batch_index >= state.plan().num_batches() {
        state.set_phase(RunPhase::Finished);
        return vec![Effect::Finish];
    }
    state.set_phase(RunPhase::Fetching {
        batch_index,
        page_index: 0,
    });
    state
        .current_window()
        .map(Effect::FetchWindow)
        .into_iter()
        .collect()
}
