//! Observer trait and implementations.

use super::CrawlEvent;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

/// Receives observation events from the crawler.
///
/// Observers are called synchronously from crawl tasks, possibly from several
/// tasks at once, and must not block.
pub trait CrawlObserver: Send + Sync {
    fn observe(&self, event: &CrawlEvent);
}

/// An observer that logs events using the tracing framework.
///
/// Retries and failures are warnings, discoveries and workload counters are
/// informational, everything else is debug output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn observe(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::Retrying {
                method,
                uri,
                attempt,
                max_retries,
                reason,
                delay,
            } => {
                warn!(
                    delay_ms = delay.as_millis() as u64,
                    "Retrying {} {} ({}/{}), {}", method, uri, attempt, max_retries, reason
                );
            }
            CrawlEvent::Fetched {
                uri,
                effective_uri,
                status,
                elapsed,
            } => {
                debug!(
                    status = *status,
                    effective_uri = %effective_uri,
                    time_ms = elapsed.as_millis() as u64,
                    "Fetched {}", uri
                );
            }
            CrawlEvent::FetchFailed {
                uri,
                attempts,
                reason,
            } => {
                warn!(attempts = *attempts, "Giving up on {}: {}", uri, reason);
            }
            CrawlEvent::SourceUpdated { from, to } => {
                info!("Source URI has been updated from \"{}\" → \"{}\"", from, to);
            }
            CrawlEvent::FeedFound { entry } => {
                info!(
                    format = %entry.format,
                    content_type = %entry.content_type,
                    "Found feed: {}", entry.effective_uri
                );
            }
            CrawlEvent::PipelineAborted { uri, stage, reason } => {
                debug!(stage = *stage, "Stopped processing {}: {}", uri, reason);
            }
            CrawlEvent::LinkEnqueued { stage, uri } => {
                debug!(stage = *stage, "Queued {}", uri);
            }
            CrawlEvent::LinkRejected {
                stage,
                uri,
                host,
                root_domain,
            } => {
                debug!(
                    stage = *stage,
                    uri = %uri,
                    "\"{}\" is NOT part of the \"{}\" domain", host, root_domain
                );
            }
            CrawlEvent::Status { pending, results } => {
                info!(queue = *pending, results = *results, "Workload size");
            }
            CrawlEvent::StageFailed { uri, stage, error } => {
                warn!(stage = *stage, "Stage failed for {}: {}", uri, error);
            }
        }
    }
}

/// An observer that records events in memory, for tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RwLock<Vec<CrawlEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events.read().clone()
    }

    /// Returns the recorded events of one kind (see [`CrawlEvent::kind`]).
    pub fn events_of(&self, kind: &str) -> Vec<CrawlEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.kind() == kind)
            .cloned()
            .collect()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl CrawlObserver for RecordingObserver {
    fn observe(&self, event: &CrawlEvent) {
        self.events.write().push(event.clone());
    }
}
