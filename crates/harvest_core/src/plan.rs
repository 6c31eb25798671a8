use thiserror::Error;

use crate::Window;

/// Largest `max_results` the arXiv query API accepts for a single request.
pub const MAX_PAGE_SIZE: usize = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,
    #[error("page size {page_size} exceeds the api maximum of {max}")]
    PageSizeTooLarge { page_size: usize, max: usize },
    #[error("batch size {batch_size} is not a multiple of page size {page_size}")]
    Misaligned { batch_size: usize, page_size: usize },
    #[error("query must not be empty")]
    EmptyQuery,
}

/// Everything needed to derive the window sequence of a run.
///
/// Windows are a pure function of `(batch_index, page_index)`, so a plan can
/// be walked from any point without replaying earlier requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestPlan {
    query: String,
    total_target: u64,
    page_size: usize,
    batch_size: usize,
}

impl HarvestPlan {
    pub fn new(
        query: impl Into<String>,
        total_target: u64,
        page_size: usize,
        batch_size: usize,
    ) -> Result<Self, PlanError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(PlanError::EmptyQuery);
        }
        if page_size == 0 {
            return Err(PlanError::ZeroPageSize);
        }
        if batch_size == 0 {
            return Err(PlanError::ZeroBatchSize);
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(PlanError::PageSizeTooLarge {
                page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        if batch_size % page_size != 0 {
            return Err(PlanError::Misaligned {
                batch_size,
                page_size,
            });
        }
        Ok(Self {
            query,
            total_target,
            page_size,
            batch_size,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn total_target(&self) -> u64 {
        self.total_target
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn windows_per_batch(&self) -> usize {
        self.batch_size / self.page_size
    }

    /// Number of whole batches; records past the last whole batch are not harvested.
    pub fn num_batches(&self) -> usize {
        (self.total_target / self.batch_size as u64) as usize
    }

    /// Records the plan leaves out because they do not fill a whole batch.
    pub fn dropped_records(&self) -> u64 {
        self.total_target % self.batch_size as u64
    }

    /// Saturates at `usize::MAX` for totals no run could reach.
    pub fn total_windows(&self) -> usize {
        self.num_batches().saturating_mul(self.windows_per_batch())
    }

    /// Window for page `page_index` of batch `batch_index`.
    pub fn window(&self, batch_index: usize, page_index: usize) -> Window {
        let global = (batch_index as u64)
            .saturating_mul(self.windows_per_batch() as u64)
            .saturating_add(page_index as u64);
        Window::new(global.saturating_mul(self.page_size as u64), self.page_size)
    }

    pub fn windows(&self) -> Windows<'_> {
        self.windows_from(0, 0)
    }

    /// Lazy window sequence starting at `(batch_index, page_index)`.
    pub fn windows_from(&self, batch_index: usize, page_index: usize) -> Windows<'_> {
        let next = batch_index
            .saturating_mul(self.windows_per_batch())
            .saturating_add(page_index);
        Windows {
            plan: self,
            next: next.min(self.total_windows()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedWindow {
    pub batch_index: usize,
    pub page_index: usize,
    pub window: Window,
}

impl PlannedWindow {
    pub fn is_last_in_batch(&self, plan: &HarvestPlan) -> bool {
        self.page_index + 1 == plan.windows_per_batch()
    }
}

pub struct Windows<'a> {
    plan: &'a HarvestPlan,
    next: usize,
}

impl Iterator for Windows<'_> {
    type Item = PlannedWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.plan.total_windows() {
            return None;
        }
        let per_batch = self.plan.windows_per_batch();
        let batch_index = self.next / per_batch;
        let page_index = self.next % per_batch;
        self.next += 1;
        Some(PlannedWindow {
            batch_index,
            page_index,
            window: self.plan.window(batch_index, page_index),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.plan.total_windows().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows<'_> {}
