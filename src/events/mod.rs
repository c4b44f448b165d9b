//! Observation events emitted while a crawl runs
//!
//! Retries, rejected links, status counters and the like are reported to an
//! injected [`CrawlObserver`] rather than written to a fixed sink. The default
//! [`TracingObserver`] forwards everything to `tracing`.

mod observer;

pub use observer::{CrawlObserver, RecordingObserver, TracingObserver};

use crate::state::FeedEntry;
use std::time::Duration;

/// Something noteworthy that happened during a crawl
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// A transient failure is about to be retried
    Retrying {
        method: String,
        uri: String,
        /// 1-based number of the retry about to happen
        attempt: u32,
        max_retries: u32,
        reason: String,
        delay: Duration,
    },

    /// A response was received from the transport
    Fetched {
        uri: String,
        effective_uri: String,
        status: u16,
        elapsed: Duration,
    },

    /// A URI was given up on after transport failures or exhausted retries
    FetchFailed {
        uri: String,
        attempts: u32,
        reason: String,
    },

    /// The source URI was replaced by the first effective URI
    SourceUpdated { from: String, to: String },

    /// A response was identified as a feed
    FeedFound { entry: FeedEntry },

    /// A stage stopped the pipeline for a URI
    PipelineAborted {
        uri: String,
        stage: &'static str,
        reason: String,
    },

    /// A stage queued a newly discovered URI
    LinkEnqueued { stage: &'static str, uri: String },

    /// A scraped link was outside the source's root domain
    LinkRejected {
        stage: &'static str,
        uri: String,
        host: String,
        root_domain: String,
    },

    /// Workload counters after a response went through the pipeline
    Status { pending: usize, results: usize },

    /// A stage failed; processing of the URI ended there
    StageFailed {
        uri: String,
        stage: &'static str,
        error: String,
    },
}

impl CrawlEvent {
    /// Short machine-readable name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Retrying { .. } => "retrying",
            Self::Fetched { .. } => "fetched",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::SourceUpdated { .. } => "source_updated",
            Self::FeedFound { .. } => "feed_found",
            Self::PipelineAborted { .. } => "pipeline_aborted",
            Self::LinkEnqueued { .. } => "link_enqueued",
            Self::LinkRejected { .. } => "link_rejected",
            Self::Status { .. } => "status",
            Self::StageFailed { .. } => "stage_failed",
        }
    }
}
