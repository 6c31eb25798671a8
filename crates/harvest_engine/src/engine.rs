use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};
use harvest_core::{update, Effect, HarvestPlan, HarvestState, Msg};
use tokio_util::sync::CancellationToken;

use crate::{
    BatchWriter, HarvestError, HarvestEvent, HarvestSettings, RetryingPager, RunError, RunSummary,
    TotalTarget,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: HarvestEvent) {}
}

/// Builds the plan for `settings`, asking the API for the total when needed.
///
/// The batch geometry is validated first, so a bad configuration fails with
/// `InvalidPlan` without issuing a single request.
pub async fn plan_harvest(
    pager: &RetryingPager,
    settings: &HarvestSettings,
    sink: &dyn ProgressSink,
) -> Result<HarvestPlan, HarvestError> {
    let query = settings.query.as_str();
    HarvestPlan::new(query, 0, settings.page_size, settings.batch_size)?;

    let total = match settings.total {
        TotalTarget::Explicit(total) => total,
        TotalTarget::FromApi => {
            let total = pager.lookup_total(query, sink).await?;
            engine_info!("Query {:?} reports {} entries", query, total);
            total
        }
    };
    Ok(HarvestPlan::new(
        query,
        total,
        settings.page_size,
        settings.batch_size,
    )?)
}

/// Drives a plan to completion: one request at a time, one pacing delay per
/// accepted page, one artifact per full batch.
pub struct Harvester {
    pager: RetryingPager,
    writer: Arc<dyn BatchWriter>,
    pacing: Duration,
}

impl Harvester {
    pub fn new(pager: RetryingPager, writer: Arc<dyn BatchWriter>, pacing: Duration) -> Self {
        Self {
            pager,
            writer,
            pacing,
        }
    }

    /// Run `plan` from `start_batch` on.
    ///
    /// Cancellation is honoured at every suspension point (request, backoff,
    /// pacing). On any failure the in-progress batch is dropped unwritten and
    /// the error carries the last flushed batch index.
    pub async fn run(
        &self,
        plan: &HarvestPlan,
        start_batch: usize,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, RunError> {
        engine_info!(
            "Harvest query={:?} batches={} pages_per_batch={} page_size={} start_batch={}",
            plan.query(),
            plan.num_batches(),
            plan.windows_per_batch(),
            plan.page_size(),
            start_batch
        );
        if plan.dropped_records() > 0 {
            engine_warn!(
                "{} records past the last full batch will not be harvested",
                plan.dropped_records()
            );
        }
        sink.emit(HarvestEvent::PlanReady {
            num_batches: plan.num_batches(),
            windows_per_batch: plan.windows_per_batch(),
            start_batch,
            dropped_records: plan.dropped_records(),
        });

        let (mut state, effects) =
            update(HarvestState::resume_from(plan.clone(), start_batch), Msg::Start);
        let mut queue: VecDeque<Effect> = effects.into();
        let mut artifacts = Vec::new();

        while let Some(effect) = queue.pop_front() {
            let msg = match effect {
                Effect::FetchWindow(planned) => {
                    let fetched = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Err(HarvestError::Cancelled),
                        result = self.pager.fetch_page(plan.query(), planned.window, sink) => result,
                    };
                    match fetched {
                        Ok(page) => {
                            engine_info!(
                                "Batch {} page {} window {} fetched",
                                planned.batch_index,
                                planned.page_index,
                                planned.window
                            );
                            sink.emit(HarvestEvent::PageAccepted {
                                batch_index: planned.batch_index,
                                page_index: planned.page_index,
                                window: planned.window,
                            });
                            Msg::PageFetched(page)
                        }
                        Err(err) => return Err(abort(state, err)),
                    }
                }
                Effect::Pace => {
                    let paced = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => false,
                        _ = tokio::time::sleep(self.pacing) => true,
                    };
                    if !paced {
                        return Err(abort(state, HarvestError::Cancelled));
                    }
                    continue;
                }
                Effect::FlushBatch { batch_index, batch } => {
                    match self.writer.write_batch(batch_index, &batch) {
                        Ok(path) => {
                            engine_info!(
                                "Batch {} flushed: {} records to {:?}",
                                batch_index,
                                batch.len(),
                                path
                            );
                            sink.emit(HarvestEvent::BatchFlushed {
                                batch_index,
                                records: batch.len(),
                                path: path.clone(),
                            });
                            artifacts.push(path);
                            Msg::BatchFlushed { batch_index }
                        }
                        Err(source) => {
                            return Err(abort(
                                state,
                                HarvestError::WriteFailure {
                                    batch_index,
                                    source,
                                },
                            ))
                        }
                    }
                }
                Effect::Reject(err) => return Err(abort(state, err.into())),
                Effect::Finish => {
                    engine_info!("Harvest finished");
                    continue;
                }
            };

            let (next, effects) = update(state, msg);
            state = next;
            queue.extend(effects);
        }

        Ok(RunSummary {
            batches_flushed: state.batches_flushed(),
            pages_fetched: state.pages_fetched(),
            last_flushed: state.last_flushed(),
            artifacts,
        })
    }
}

fn abort(state: HarvestState, cause: HarvestError) -> RunError {
    let (state, _) = update(state, Msg::Abort);
    let last_flushed = state.last_flushed();
    engine_error!(
        "Harvest aborted (last flushed batch {:?}): {}",
        last_flushed,
        cause
    );
    RunError {
        cause,
        last_flushed,
    }
}
