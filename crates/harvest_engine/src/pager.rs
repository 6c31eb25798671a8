use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use harvest_core::{Page, Window};

use crate::{
    AttemptFailure, DecodedPage, HarvestError, HarvestEvent, PageDecoder, PageFetcher,
    ProgressSink,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause before re-requesting the same window.
    pub backoff: Duration,
    /// Total attempts per window; `None` never gives up.
    pub ceiling: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(5),
            ceiling: None,
        }
    }
}

/// Fetch + decode with the incomplete-page retry policy.
///
/// A short page, a transport failure and an undecodable body are all retried
/// on the identical window after the backoff; the offset never advances.
pub struct RetryingPager {
    fetcher: Arc<dyn PageFetcher>,
    decoder: Arc<dyn PageDecoder>,
    policy: RetryPolicy,
}

impl RetryingPager {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        decoder: Arc<dyn PageDecoder>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            decoder,
            policy,
        }
    }

    /// Returns exactly `window.size` records or fails once the ceiling is hit.
    pub async fn fetch_page(
        &self,
        query: &str,
        window: Window,
        sink: &dyn ProgressSink,
    ) -> Result<Page, HarvestError> {
        let decoded = self
            .fetch_until(query, window, sink, |page| page.records.len() == window.size)
            .await?;
        Ok(Page::new(decoded.records, window.size))
    }

    /// The result count the API reports for `query`.
    pub async fn lookup_total(
        &self,
        query: &str,
        sink: &dyn ProgressSink,
    ) -> Result<u64, HarvestError> {
        let decoded = self
            .fetch_until(query, Window::new(0, 1), sink, |_| true)
            .await?;
        decoded.total_results.ok_or_else(|| HarvestError::MissingTotal {
            query: query.to_string(),
        })
    }

    async fn fetch_until(
        &self,
        query: &str,
        window: Window,
        sink: &dyn ProgressSink,
        accept: impl Fn(&DecodedPage) -> bool,
    ) -> Result<DecodedPage, HarvestError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let failure = match self.attempt(query, window).await {
                Ok(decoded) if accept(&decoded) => {
                    if attempt > 1 {
                        engine_debug!("Window {} complete after {} attempts", window, attempt);
                    }
                    return Ok(decoded);
                }
                Ok(decoded) => AttemptFailure::Incomplete {
                    observed: decoded.records.len(),
                    expected: window.size,
                },
                Err(failure) => failure,
            };

            sink.emit(HarvestEvent::AttemptFailed {
                window,
                attempt,
                failure: failure.clone(),
            });

            if self.policy.ceiling.is_some_and(|ceiling| attempt >= ceiling) {
                engine_warn!(
                    "Window {} giving up after {} attempts: {}",
                    window,
                    attempt,
                    failure
                );
                return Err(match failure {
                    AttemptFailure::Transport(source) => HarvestError::FetchFailed {
                        window,
                        attempts: attempt,
                        source,
                    },
                    AttemptFailure::Incomplete { observed, .. } => HarvestError::ExhaustedRetries {
                        window,
                        attempts: attempt,
                        last_observed: observed,
                    },
                    AttemptFailure::Undecodable(_) => HarvestError::ExhaustedRetries {
                        window,
                        attempts: attempt,
                        last_observed: 0,
                    },
                });
            }

            engine_warn!(
                "Window {} attempt {}: {}, retrying in {:?}",
                window,
                attempt,
                failure,
                self.policy.backoff
            );
            tokio::time::sleep(self.policy.backoff).await;
        }
    }

    async fn attempt(&self, query: &str, window: Window) -> Result<DecodedPage, AttemptFailure> {
        let bytes = self
            .fetcher
            .fetch_page(query, window)
            .await
            .map_err(AttemptFailure::Transport)?;
        self.decoder
            .decode(&bytes)
            .map_err(|err| AttemptFailure::Undecodable(err.to_string()))
    }
}
