use std::sync::Arc;

use anyhow::{anyhow, Context};
use engine_logging::{engine_error, engine_info, engine_warn};
use harvest_core::HarvestPlan;
use harvest_engine::{
    plan_harvest, AtomDecoder, AtomicFileWriter, HarvestSettings, Harvester, JsonBatchWriter,
    NullSink, ReqwestFetcher, RetryingPager,
};
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::persistence::{load_resume_state, StateRecorder};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings()?;
    let retry_policy = settings.retry_policy()?;
    let pacing = settings.pacing()?;

    let files = AtomicFileWriter::open(&settings.output_dir)
        .with_context(|| format!("preparing {}", settings.output_dir.display()))?;

    let fetcher = ReqwestFetcher::new(settings.fetch_settings()?)?;
    let pager = RetryingPager::new(
        Arc::new(fetcher),
        Arc::new(AtomDecoder::new(settings.limits)),
        retry_policy,
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    let plan = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(anyhow!("interrupted while planning")),
        plan = plan_harvest(&pager, &settings, &NullSink) => plan.context("planning harvest")?,
    };
    let start_batch = start_batch(&cli, &settings, &plan);

    let writer = JsonBatchWriter::new(files.clone(), settings.file_prefix.clone());
    let harvester = Harvester::new(pager, Arc::new(writer), pacing);
    let recorder = StateRecorder::new(files, &plan);

    match harvester.run(&plan, start_batch, &recorder, &cancel).await {
        Ok(summary) => {
            engine_info!(
                "Done: {} batches, {} pages, last batch {:?}",
                summary.batches_flushed,
                summary.pages_fetched,
                summary.last_flushed
            );
            Ok(())
        }
        Err(err) => {
            engine_error!(
                "Rerun with --resume (or --start-batch {}) to continue",
                err.resume_batch()
            );
            Err(err.into())
        }
    }
}

fn start_batch(cli: &Cli, settings: &HarvestSettings, plan: &HarvestPlan) -> usize {
    if let Some(index) = cli.start_batch {
        return index;
    }
    if !cli.resume {
        return 0;
    }
    match load_resume_state(&settings.output_dir) {
        Some(state) if state.matches(plan) => state.next_batch(),
        Some(_) => {
            engine_warn!("Resume state belongs to a different query or batch geometry; starting over");
            0
        }
        None => 0,
    }
}

fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            engine_warn!("Interrupt received; stopping at the next pause");
            cancel.cancel();
        }
    });
}
