use std::fs;
use std::path::Path;

use chrono::Utc;
use engine_logging::{engine_error, engine_info, engine_warn};
use harvest_core::HarvestPlan;
use harvest_engine::{AtomicFileWriter, HarvestEvent, ProgressSink};
use serde::{Deserialize, Serialize};

const STATE_FILENAME: &str = ".harvest_state.ron";

/// Progress of a run as recorded next to its batch files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ResumeState {
    pub query: String,
    pub page_size: usize,
    pub batch_size: usize,
    pub last_flushed: Option<usize>,
    pub updated_utc: String,
}

impl ResumeState {
    /// Only a run over the same query and window geometry can be continued.
    pub fn matches(&self, plan: &HarvestPlan) -> bool {
        self.query == plan.query()
            && self.page_size == plan.page_size()
            && self.batch_size == plan.batch_size()
    }

    pub fn next_batch(&self) -> usize {
        self.last_flushed.map_or(0, |index| index + 1)
    }
}

pub(crate) fn load_resume_state(output_dir: &Path) -> Option<ResumeState> {
    let path = output_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return None;
        }
        Err(err) => {
            engine_warn!("Failed to read resume state from {:?}: {}", path, err);
            return None;
        }
    };

    match ron::from_str(&content) {
        Ok(state) => {
            engine_info!("Loaded resume state from {:?}", path);
            Some(state)
        }
        Err(err) => {
            engine_warn!("Failed to parse resume state from {:?}: {}", path, err);
            None
        }
    }
}

pub(crate) fn save_resume_state(files: &AtomicFileWriter, state: &ResumeState) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(state, pretty) {
        Ok(text) => text,
        Err(err) => {
            engine_error!("Failed to serialize resume state: {}", err);
            return;
        }
    };

    if let Err(err) = files.write(STATE_FILENAME, content.as_bytes()) {
        engine_error!("Failed to write resume state to {:?}: {}", files.dir(), err);
    }
}

/// Records every flushed batch in the output directory's state file.
pub(crate) struct StateRecorder {
    files: AtomicFileWriter,
    query: String,
    page_size: usize,
    batch_size: usize,
}

impl StateRecorder {
    pub fn new(files: AtomicFileWriter, plan: &HarvestPlan) -> Self {
        Self {
            files,
            query: plan.query().to_string(),
            page_size: plan.page_size(),
            batch_size: plan.batch_size(),
        }
    }
}

impl ProgressSink for StateRecorder {
    fn emit(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::PlanReady {
                num_batches,
                start_batch,
                dropped_records,
                ..
            } => {
                engine_info!(
                    "Planned {} batches, starting at {}, {} trailing records dropped",
                    num_batches,
                    start_batch,
                    dropped_records
                );
            }
            HarvestEvent::BatchFlushed { batch_index, .. } => {
                let state = ResumeState {
                    query: self.query.clone(),
                    page_size: self.page_size,
                    batch_size: self.batch_size,
                    last_flushed: Some(batch_index),
                    updated_utc: Utc::now().to_rfc3339(),
                };
                save_resume_state(&self.files, &state);
            }
            HarvestEvent::AttemptFailed { .. } | HarvestEvent::PageAccepted { .. } => {}
        }
    }
}
