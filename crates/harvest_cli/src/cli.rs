//! Command-line surface: flags and env vars layered over an optional RON file.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use harvest_engine::{HarvestSettings, TotalTarget};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "harvest",
    about = "Harvest paged search results into fixed-size batch files"
)]
pub struct Cli {
    /// RON settings file; flags below override its values
    #[arg(long, env = "HARVEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Search expression, e.g. `cat:astro-ph` or `all:electron`
    #[arg(long, env = "HARVEST_QUERY")]
    pub query: Option<String>,

    /// Records requested per page
    #[arg(long, env = "HARVEST_PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Records per batch file; must be a multiple of the page size
    #[arg(long, env = "HARVEST_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Records to harvest; the API's reported total is used when omitted
    #[arg(long, env = "HARVEST_TOTAL")]
    pub total: Option<u64>,

    /// Seconds to wait before re-requesting an incomplete page
    #[arg(long, env = "HARVEST_RETRY_BACKOFF_SECS")]
    pub retry_backoff_secs: Option<f64>,

    /// Seconds to wait after every accepted page
    #[arg(long, env = "HARVEST_INTER_REQUEST_DELAY_SECS")]
    pub inter_request_delay_secs: Option<f64>,

    /// Attempts per page before giving up (default: never give up)
    #[arg(
        long,
        env = "HARVEST_RETRY_CEILING",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub retry_ceiling: Option<u32>,

    #[arg(long, env = "HARVEST_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Prefix of batch file names
    #[arg(long, env = "HARVEST_FILE_PREFIX")]
    pub file_prefix: Option<String>,

    #[arg(long, env = "HARVEST_BASE_URL")]
    pub base_url: Option<String>,

    /// Continue after the last batch recorded in the output directory
    #[arg(long)]
    pub resume: bool,

    /// Start at this batch index; takes precedence over --resume
    #[arg(long)]
    pub start_batch: Option<usize>,

    /// Also write the log to this file
    #[arg(long, env = "HARVEST_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings from `--config` (or defaults) with every given flag applied on top.
    pub fn settings(&self) -> anyhow::Result<HarvestSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                ron::from_str::<HarvestSettings>(&content)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => HarvestSettings::default(),
        };
        self.apply(&mut settings);
        Ok(settings)
    }

    fn apply(&self, settings: &mut HarvestSettings) {
        if let Some(query) = &self.query {
            settings.query = query.clone();
        }
        if let Some(page_size) = self.page_size {
            settings.page_size = page_size;
        }
        if let Some(batch_size) = self.batch_size {
            settings.batch_size = batch_size;
        }
        if let Some(total) = self.total {
            settings.total = TotalTarget::Explicit(total);
        }
        if let Some(secs) = self.retry_backoff_secs {
            settings.retry_backoff_secs = secs;
        }
        if let Some(secs) = self.inter_request_delay_secs {
            settings.inter_request_delay_secs = secs;
        }
        if let Some(ceiling) = self.retry_ceiling {
            settings.retry_ceiling = Some(ceiling);
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(prefix) = &self.file_prefix {
            settings.file_prefix = prefix.clone();
        }
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
    }
}
