//! Scheduler for driving a crawl to completion
//!
//! This module handles:
//! - Admitting queued URIs while fewer than `concurrency` fetches are in flight
//! - Running each fetched response through the pipeline
//! - Detecting completion (nothing pending and nothing in flight)
//! - Honouring cancellation between admission cycles

use crate::config::Config;
use crate::crawler::fetcher::Transport;
use crate::crawler::queue::Queue;
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::events::{CrawlEvent, CrawlObserver, TracingObserver};
use crate::pipeline::{Pipeline, PipelineOutcome, StageContext};
use crate::state::{CrawlState, FeedEntry, ResultSet};
use crate::url::request_uri;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// How a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    /// The queue drained and every fetch finished
    Complete,

    /// The crawl was cancelled before the queue drained
    Cancelled,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The URI the crawl was started with
    pub requested_uri: String,

    /// The source URI after following the first redirect
    pub source_uri: String,

    /// Located feeds, in the order they were found
    pub feeds: Vec<FeedEntry>,

    pub status: CrawlStatus,

    /// Responses that reached the pipeline
    pub pages_fetched: usize,

    /// URIs dropped after exhausting retries or on a permanent transport error
    pub fetch_failures: usize,

    /// Responses whose pipeline run ended in a stage error
    pub stage_failures: usize,

    /// URIs handed out by the queue
    pub uris_visited: usize,

    /// URIs still queued when the crawl stopped
    pub uris_pending: usize,

    pub elapsed: Duration,
}

/// What happened to a single queued URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Processed,
    FetchFailed,
    StageFailed,
}

#[derive(Debug, Default)]
struct Tally {
    pages_fetched: usize,
    fetch_failures: usize,
    stage_failures: usize,
}

impl Tally {
    fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Processed => self.pages_fetched += 1,
            TaskOutcome::FetchFailed => self.fetch_failures += 1,
            TaskOutcome::StageFailed => {
                self.pages_fetched += 1;
                self.stage_failures += 1;
            }
        }
    }
}

/// Everything one crawl task needs, cloned per task
#[derive(Clone)]
struct CrawlTask {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    pipeline: Arc<Pipeline>,
    ctx: StageContext,
}

impl CrawlTask {
    async fn run(self, uri: String) -> TaskOutcome {
        let observer = self.ctx.observer.as_ref();

        let response =
            match fetch_with_retry(self.transport.as_ref(), &self.retry, observer, &uri).await {
                Ok(response) => response,
                Err(err) => {
                    observer.observe(&CrawlEvent::FetchFailed {
                        uri,
                        attempts: err.attempts(),
                        reason: err.to_string(),
                    });
                    return TaskOutcome::FetchFailed;
                }
            };

        match self.pipeline.run(&response, &self.ctx) {
            Ok(PipelineOutcome::Completed) => TaskOutcome::Processed,
            Ok(PipelineOutcome::Aborted { stage, reason }) => {
                observer.observe(&CrawlEvent::PipelineAborted {
                    uri,
                    stage,
                    reason: reason.to_string(),
                });
                TaskOutcome::Processed
            }
            Err(err) => {
                observer.observe(&CrawlEvent::StageFailed {
                    uri,
                    stage: err.stage,
                    error: err.source.to_string(),
                });
                TaskOutcome::StageFailed
            }
        }
    }
}

/// Drives the queue with a bounded number of concurrent fetches
pub struct Scheduler {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    pipeline: Arc<Pipeline>,
    observer: Arc<dyn CrawlObserver>,
    concurrency: usize,
    cancellation: CancellationToken,
}

impl Scheduler {
    /// Creates a scheduler with the standard pipeline, default retry policy
    /// and tracing observer
    ///
    /// A concurrency of zero is raised to one.
    pub fn new(transport: Arc<dyn Transport>, concurrency: usize) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
            pipeline: Arc::new(Pipeline::standard()),
            observer: Arc::new(TracingObserver),
            concurrency: concurrency.max(1),
            cancellation: CancellationToken::new(),
        }
    }

    /// Creates a scheduler configured from `config`
    pub fn from_config(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self::new(transport, config.crawler.concurrency)
            .with_retry_policy(RetryPolicy::from_config(&config.retry))
            .with_pipeline(Pipeline::from_config(&config.crawler))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Token that stops the crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Crawls from `source_uri` until the queue drains or the crawl is cancelled
    ///
    /// Each cycle admits queued URIs until `concurrency` fetches are in flight,
    /// then waits for any one of them to finish. The crawl is complete when a
    /// cycle finds the queue empty and nothing in flight.
    pub async fn run(&self, source_uri: &str) -> CrawlReport {
        let started = Instant::now();
        let source = request_uri(source_uri);

        let queue = Arc::new(Queue::new());
        queue.push(&source);

        let state = Arc::new(CrawlState::new(source.clone()));
        let results = Arc::new(ResultSet::new());
        let ctx = StageContext::new(
            Arc::clone(&queue),
            Arc::clone(&results),
            Arc::clone(&state),
            Arc::clone(&self.observer),
        );

        tracing::info!(
            concurrency = self.concurrency,
            stages = ?self.pipeline.stage_names(),
            "Starting crawl from {}", source
        );

        let mut in_flight: JoinSet<TaskOutcome> = JoinSet::new();
        let mut tally = Tally::default();
        let mut status = CrawlStatus::Complete;

        loop {
            if self.cancellation.is_cancelled() {
                status = CrawlStatus::Cancelled;
                break;
            }

            while in_flight.len() < self.concurrency {
                let Some(uri) = queue.pop() else {
                    break;
                };

                let task = CrawlTask {
                    transport: Arc::clone(&self.transport),
                    retry: self.retry,
                    pipeline: Arc::clone(&self.pipeline),
                    ctx: ctx.clone(),
                };
                in_flight.spawn(task.run(uri));
            }

            if in_flight.is_empty() {
                tracing::debug!("Queue drained with nothing in flight");
                break;
            }

            tokio::select! {
                _ = self.cancellation.cancelled() => {
                    status = CrawlStatus::Cancelled;
                    break;
                }
                joined = in_flight.join_next() => match joined {
                    Some(Ok(outcome)) => tally.record(outcome),
                    Some(Err(e)) => {
                        tracing::error!("Crawl task failed: {}", e);
                        tally.record(TaskOutcome::StageFailed);
                    }
                    None => {}
                },
            }
        }

        if status == CrawlStatus::Cancelled {
            tracing::info!(
                in_flight = in_flight.len(),
                pending = queue.len(),
                "Crawl cancelled"
            );
            in_flight.shutdown().await;
        }

        let report = CrawlReport {
            requested_uri: source_uri.to_string(),
            source_uri: state.source_uri(),
            feeds: results.snapshot(),
            status,
            pages_fetched: tally.pages_fetched,
            fetch_failures: tally.fetch_failures,
            stage_failures: tally.stage_failures,
            uris_visited: queue.completed_count(),
            uris_pending: queue.len(),
            elapsed: started.elapsed(),
        };

        tracing::info!(
            feeds = report.feeds.len(),
            visited = report.uris_visited,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Crawl {}",
            report.status.as_str()
        );

        report
    }
}
