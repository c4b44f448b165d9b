//! Retry policy for transient fetch failures
//!
//! A fetch is retried when the server answers with a 5xx status or the
//! connection could not be established. Each retry waits a random delay drawn
//! uniformly from `[0, min(ceiling, base * 2^n)]`, where `n` is the number of
//! the retry about to be made.

use crate::config::RetryConfig;
use crate::crawler::fetcher::{FetchResponse, Transport};
use crate::events::{CrawlEvent, CrawlObserver};
use crate::TransportError;
use rand::Rng;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Why a URI could not be fetched once retries ran out
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{source} (after {attempts} attempts)")]
    Transport {
        source: TransportError,
        attempts: u32,
    },

    #[error("Server error {status} for {uri} (after {attempts} attempts)")]
    ServerError {
        uri: String,
        status: u16,
        attempts: u32,
    },
}

impl FetchError {
    /// Total number of requests made, including the first
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Transport { attempts, .. } | Self::ServerError { attempts, .. } => *attempts,
        }
    }
}

/// Decides whether and when to retry a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns true if the request should be made again
    ///
    /// `retries` is the number of retries already performed for this URI.
    pub fn should_retry(
        &self,
        retries: u32,
        outcome: &Result<FetchResponse, TransportError>,
    ) -> bool {
        if retries >= self.max_retries {
            return false;
        }

        match outcome {
            Ok(response) => response.is_server_error(),
            Err(err) => err.is_connection_failure(),
        }
    }

    /// Upper bound of the delay before retry number `retry`
    pub fn delay_ceiling(&self, retry: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        let exponential = base_ms.saturating_mul(2u64.saturating_pow(retry.min(32)));
        Duration::from_millis(exponential.min(max_ms))
    }

    /// Random delay before retry number `retry`
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let ceiling = self.delay_ceiling(retry).as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..=ceiling))
    }
}

/// Describes a retryable outcome for logging
fn retry_reason(outcome: &Result<FetchResponse, TransportError>) -> String {
    match outcome {
        Ok(response) => format!("HTTP {}", response.status),
        Err(err) => err.to_string(),
    }
}

/// Fetches a URI, retrying transient failures according to `policy`
///
/// A [`CrawlEvent::Fetched`] is emitted for every response received and a
/// [`CrawlEvent::Retrying`] before every retry. 4xx responses are returned as-is;
/// a 5xx that survives every retry becomes [`FetchError::ServerError`].
pub async fn fetch_with_retry(
    transport: &dyn Transport,
    policy: &RetryPolicy,
    observer: &dyn CrawlObserver,
    uri: &str,
) -> Result<FetchResponse, FetchError> {
    let mut retries = 0;

    loop {
        let started = Instant::now();
        let outcome = transport.fetch(uri).await;

        if let Ok(response) = &outcome {
            observer.observe(&CrawlEvent::Fetched {
                uri: uri.to_string(),
                effective_uri: response.effective_uri().to_string(),
                status: response.status,
                elapsed: started.elapsed(),
            });
        }

        if !policy.should_retry(retries, &outcome) {
            let attempts = retries + 1;
            return match outcome {
                Ok(response) if response.is_server_error() => Err(FetchError::ServerError {
                    uri: uri.to_string(),
                    status: response.status,
                    attempts,
                }),
                Ok(response) => Ok(response),
                Err(source) => Err(FetchError::Transport { source, attempts }),
            };
        }

        retries += 1;
        let delay = policy.backoff_delay(retries);
        observer.observe(&CrawlEvent::Retrying {
            method: "GET".to_string(),
            uri: uri.to_string(),
            attempt: retries,
            max_retries: policy.max_retries(),
            reason: retry_reason(&outcome),
            delay,
        });

        tokio::time::sleep(delay).await;
    }
}
