//! Per-response processing pipeline
//!
//! Every fetched response runs through an ordered list of [`Stage`]s. A stage
//! may record a feed, queue more URIs, or stop the pipeline for this response.
//! Stages run synchronously; the shared state they touch is internally locked.

mod autodiscovery;
mod effective_uri;
mod known_good;
mod scrape;
mod status;
mod valid_feed;

pub use autodiscovery::{Autodiscovery, EXCLUDED_TYPE_FRAGMENTS};
pub use effective_uri::EffectiveUri;
pub use known_good::KnownGood;
pub use scrape::{Scrape, ScrapeMode, FEED_KEYWORDS};
pub use status::Status;
pub use valid_feed::ValidFeed;

use crate::crawler::{Document, FetchResponse, Queue};
use crate::events::{CrawlEvent, CrawlObserver};
use crate::state::{CrawlState, FeedFormat, ResultSet};
use crate::HostnameError;
use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Why a stage stopped the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The response is itself a feed; its links are not followed
    IsAFeed(FeedFormat),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsAFeed(_) => f.write_str("is-a-feed"),
        }
    }
}

/// What the pipeline should do after a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Hand the same response to the next stage
    Continue,

    /// Skip the remaining stages for this response
    Abort(AbortReason),
}

/// Failures inside a stage
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Hostname(#[from] HostnameError),

    #[error("Invalid effective URI \"{uri}\": {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
}

/// A stage failure, tagged with the stage it happened in
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: &'static str,
    #[source]
    pub source: StageError,
}

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every stage ran
    Completed,

    /// A stage stopped the pipeline
    Aborted {
        stage: &'static str,
        reason: AbortReason,
    },
}

/// Shared crawl state handed to every stage
#[derive(Clone)]
pub struct StageContext {
    pub queue: Arc<Queue>,
    pub results: Arc<ResultSet>,
    pub state: Arc<CrawlState>,
    pub observer: Arc<dyn CrawlObserver>,
}

impl StageContext {
    pub fn new(
        queue: Arc<Queue>,
        results: Arc<ResultSet>,
        state: Arc<CrawlState>,
        observer: Arc<dyn CrawlObserver>,
    ) -> Self {
        Self {
            queue,
            results,
            state,
            observer,
        }
    }

    /// Queues a discovered URI, reporting it if it was new
    pub fn enqueue(&self, stage: &'static str, uri: &Url) -> bool {
        let added = self.queue.push(uri.as_str());
        if added {
            self.observer.observe(&CrawlEvent::LinkEnqueued {
                stage,
                uri: uri.to_string(),
            });
        }
        added
    }
}

impl fmt::Debug for StageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageContext")
            .field("queue", &self.queue)
            .field("results", &self.results)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A response on its way through the pipeline
///
/// The body is parsed as HTML at most once, on first request.
pub struct StageInput<'a> {
    response: &'a FetchResponse,
    document: OnceCell<Document>,
}

impl<'a> StageInput<'a> {
    pub fn new(response: &'a FetchResponse) -> Self {
        Self {
            response,
            document: OnceCell::new(),
        }
    }

    pub fn response(&self) -> &FetchResponse {
        self.response
    }

    /// The body parsed as an HTML document
    pub fn document(&self) -> &Document {
        self.document
            .get_or_init(|| Document::parse(&self.response.body))
    }

    /// The effective URI, parsed
    pub fn effective_url(&self) -> Result<Url, StageError> {
        let uri = self.response.effective_uri();
        Url::parse(uri).map_err(|source| StageError::InvalidUri {
            uri: uri.to_string(),
            source,
        })
    }
}

/// One step of per-response processing
pub trait Stage: Send + Sync + fmt::Debug {
    /// Short name used in logs and events
    fn name(&self) -> &'static str;

    fn process(&self, input: &StageInput<'_>, ctx: &StageContext)
        -> Result<StageOutcome, StageError>;
}

/// An ordered list of stages
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// The standard stage order:
    /// effective URI, feed validation, autodiscovery, same-domain scrape,
    /// root-domain scrape, status
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(EffectiveUri),
            Box::new(ValidFeed),
            Box::new(Autodiscovery),
            Box::new(Scrape::new(ScrapeMode::SameDomain)),
            Box::new(Scrape::new(ScrapeMode::RootDomain)),
            Box::new(Status),
        ])
    }

    /// The standard order with the known-host shortcut after autodiscovery
    pub fn with_known_hosts() -> Self {
        Self::new(vec![
            Box::new(EffectiveUri),
            Box::new(ValidFeed),
            Box::new(Autodiscovery),
            Box::new(KnownGood),
            Box::new(Scrape::new(ScrapeMode::SameDomain)),
            Box::new(Scrape::new(ScrapeMode::RootDomain)),
            Box::new(Status),
        ])
    }

    /// Builds the pipeline selected by the crawler configuration
    pub fn from_config(config: &crate::config::CrawlerConfig) -> Self {
        if config.known_hosts {
            Self::with_known_hosts()
        } else {
            Self::standard()
        }
    }

    /// Stage names in run order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every stage in order until one aborts or fails
    pub fn run(
        &self,
        response: &FetchResponse,
        ctx: &StageContext,
    ) -> Result<PipelineOutcome, PipelineError> {
        let input = StageInput::new(response);

        for stage in &self.stages {
            let outcome = stage
                .process(&input, ctx)
                .map_err(|source| PipelineError {
                    stage: stage.name(),
                    source,
                })?;

            if let StageOutcome::Abort(reason) = outcome {
                return Ok(PipelineOutcome::Aborted {
                    stage: stage.name(),
                    reason,
                });
            }
        }

        Ok(PipelineOutcome::Completed)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::events::RecordingObserver;

    /// A context over fresh state, plus the recording observer behind it
    pub fn context(source_uri: &str) -> (StageContext, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::new());
        let ctx = StageContext::new(
            Arc::new(Queue::new()),
            Arc::new(ResultSet::new()),
            Arc::new(CrawlState::new(source_uri)),
            observer.clone(),
        );
        (ctx, observer)
    }

    pub fn html(uri: &str, body: &str) -> FetchResponse {
        FetchResponse::new(uri, 200)
            .with_content_type("text/html")
            .with_effective_uri(uri)
            .with_body(body)
    }
}
