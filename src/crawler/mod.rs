//! Crawler module for locating feeds
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing for link queries
//! - The deduplicating work queue
//! - Bounded-concurrency scheduling

mod fetcher;
mod parser;
mod queue;
mod retry;
mod scheduler;
pub mod testing;

pub use fetcher::{build_http_client, FetchResponse, HttpTransport, Transport, EFFECTIVE_URI_HEADER};
pub use parser::{Document, QueryMatches};
pub use queue::Queue;
pub use retry::{fetch_with_retry, FetchError, RetryPolicy};
pub use scheduler::{CrawlReport, CrawlStatus, Scheduler};

use crate::config::Config;
use std::sync::Arc;
use url::Url;

/// Locates the feeds reachable from `source_uri`
///
/// This is the main entry point for a crawl. It will:
/// 1. Check that the source URI is an absolute URL
/// 2. Build the HTTP transport from the configuration
/// 3. Crawl until nothing is left to fetch
///
/// # Arguments
///
/// * `source_uri` - The address to start from
/// * `config` - The locator configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The located feeds and crawl statistics
/// * `Err(LocatorError)` - The source URI or the HTTP client was invalid
pub async fn locate(source_uri: &str, config: &Config) -> crate::Result<CrawlReport> {
    Url::parse(source_uri)?;

    let transport = HttpTransport::new(&config.http, &config.user_agent)?;
    let scheduler = Scheduler::from_config(Arc::new(transport), config);

    Ok(scheduler.run(source_uri).await)
}
