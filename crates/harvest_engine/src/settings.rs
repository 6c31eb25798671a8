use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FetchSettings, RetryPolicy};

/// Length bounds applied to free-text fields while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLimits {
    pub max_authors_len: usize,
    pub max_summary_len: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            max_authors_len: 500,
            max_summary_len: 2000,
        }
    }
}

/// Where the total record count of a run comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TotalTarget {
    /// Ask the API for its reported total before planning.
    #[default]
    FromApi,
    Explicit(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { field: &'static str, value: String },
    #[error("retry_ceiling counts attempts and must be at least 1")]
    ZeroRetryCeiling,
}

/// Every recognised option of a harvest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    pub query: String,
    pub page_size: usize,
    pub batch_size: usize,
    pub total: TotalTarget,
    pub retry_backoff_secs: f64,
    pub inter_request_delay_secs: f64,
    /// Total attempts per window; `None` retries until a complete page arrives.
    pub retry_ceiling: Option<u32>,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub base_url: String,
    pub connect_timeout_secs: f64,
    pub request_timeout_secs: f64,
    pub max_bytes: u64,
    pub limits: FieldLimits,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            query: "cat:astro-ph".to_string(),
            page_size: 1_000,
            batch_size: 10_000,
            total: TotalTarget::FromApi,
            retry_backoff_secs: 5.0,
            inter_request_delay_secs: 3.0,
            retry_ceiling: None,
            output_dir: PathBuf::from("output"),
            file_prefix: "harvest".to_string(),
            base_url: fetch.base_url,
            connect_timeout_secs: fetch.connect_timeout.as_secs_f64(),
            request_timeout_secs: fetch.request_timeout.as_secs_f64(),
            max_bytes: fetch.max_bytes,
            limits: FieldLimits::default(),
        }
    }
}

impl HarvestSettings {
    pub fn retry_policy(&self) -> Result<RetryPolicy, SettingsError> {
        if self.retry_ceiling == Some(0) {
            return Err(SettingsError::ZeroRetryCeiling);
        }
        Ok(RetryPolicy {
            backoff: seconds("retry_backoff_secs", self.retry_backoff_secs)?,
            ceiling: self.retry_ceiling,
        })
    }

    pub fn pacing(&self) -> Result<Duration, SettingsError> {
        seconds("inter_request_delay_secs", self.inter_request_delay_secs)
    }

    pub fn fetch_settings(&self) -> Result<FetchSettings, SettingsError> {
        Ok(FetchSettings {
            base_url: self.base_url.clone(),
            connect_timeout: seconds("connect_timeout_secs", self.connect_timeout_secs)?,
            request_timeout: seconds("request_timeout_secs", self.request_timeout_secs)?,
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        })
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, SettingsError> {
    Duration::try_from_secs_f64(value).map_err(|_| SettingsError::InvalidDuration {
        field,
        value: value.to_string(),
    })
}
