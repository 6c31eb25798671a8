//! Harvest core: pure planning, batching and the run state machine.
mod batch;
mod effect;
mod msg;
mod page;
mod plan;
mod record;
mod state;
mod text;
mod update;

pub use batch::{Batch, BatchAccumulator, BatchError};
pub use effect::Effect;
pub use msg::Msg;
pub use page::{Page, Window};
pub use plan::{HarvestPlan, PlanError, PlannedWindow, Windows, MAX_PAGE_SIZE};
pub use record::{Column, Record};
pub use state::{HarvestState, RunPhase};
pub use text::{collapse_whitespace, shorten, strip_id_prefix, ELLIPSIS};
pub use update::update;
