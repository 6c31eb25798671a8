use crate::{BatchAccumulator, HarvestPlan, PlannedWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Fetching {
        batch_index: usize,
        page_index: usize,
    },
    Flushing {
        batch_index: usize,
    },
    Finished,
    Aborted,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Finished | RunPhase::Aborted)
    }
}

/// Run state owned by the orchestrator: the plan, the position in it and
/// the single in-progress batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestState {
    plan: HarvestPlan,
    start_batch: usize,
    phase: RunPhase,
    accumulator: BatchAccumulator,
    last_flushed: Option<usize>,
    pages_fetched: usize,
    batches_flushed: usize,
}

impl HarvestState {
    pub fn new(plan: HarvestPlan) -> Self {
        Self::resume_from(plan, 0)
    }

    /// State for a run that starts at `start_batch`; earlier batches are
    /// taken as already flushed by a previous run.
    pub fn resume_from(plan: HarvestPlan, start_batch: usize) -> Self {
        let accumulator = BatchAccumulator::new(plan.batch_size());
        Self {
            plan,
            start_batch,
            phase: RunPhase::Idle,
            accumulator,
            last_flushed: start_batch.checked_sub(1),
            pages_fetched: 0,
            batches_flushed: 0,
        }
    }

    pub fn plan(&self) -> &HarvestPlan {
        &self.plan
    }

    pub fn start_batch(&self) -> usize {
        self.start_batch
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Index of the most recent batch known to be on disk.
    pub fn last_flushed(&self) -> Option<usize> {
        self.last_flushed
    }

    /// Pages accepted during this run.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Batches flushed during this run.
    pub fn batches_flushed(&self) -> usize {
        self.batches_flushed
    }

    /// Records held by the in-progress batch.
    pub fn buffered_records(&self) -> usize {
        self.accumulator.len()
    }

    /// The window the run is waiting on, if any.
    pub fn current_window(&self) -> Option<PlannedWindow> {
        match self.phase {
            RunPhase::Fetching {
                batch_index,
                page_index,
            } => Some(PlannedWindow {
                batch_index,
                page_index,
                window: self.plan.window(batch_index, page_index),
            }),
            _ => None,
        }
    }

    pub(crate) fn accumulator_mut(&mut self) -> &mut BatchAccumulator {
        &mut self.accumulator
    }

    pub(crate) fn set_phase(&mut self, phase: RunPhase) {
        self.phase = phase;
    }

    pub(crate) fn record_page(&mut self) {
        self.pages_fetched += 1;
    }

    pub(crate) fn record_flush(&mut self, batch_index: usize) {
        self.last_flushed = Some(batch_index);
        self.batches_flushed += 1;
    }
}
