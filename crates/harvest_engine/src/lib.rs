//! Harvest engine: fetching, decoding, retry, persistence and the run loop.
mod batch_file;
mod decode;
mod engine;
mod fetch;
mod filename;
mod pager;
mod persist;
mod settings;
mod types;

pub use batch_file::{load_batch, BatchWriter, JsonBatchWriter};
pub use decode::{AtomDecoder, DecodeError, DecodedPage, PageDecoder};
pub use engine::{plan_harvest, Harvester, NullSink, ProgressSink};
pub use fetch::{query_url, FetchSettings, PageFetcher, ReqwestFetcher};
pub use filename::batch_filename;
pub use pager::{RetryPolicy, RetryingPager};
pub use persist::{AtomicFileWriter, PersistError};
pub use settings::{FieldLimits, HarvestSettings, SettingsError, TotalTarget};
pub use types::{
    AttemptFailure, FailureKind, FetchError, HarvestError, HarvestEvent, RunError, RunSummary,
};
