//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the source URI, updated once from the first effective URI
//! - `ResultSet`: append-only collection of located feeds
//! - `FeedEntry` / `FeedFormat`: one located feed and its identified format

mod crawl_state;
mod result_set;

// Re-export main types
pub use crawl_state::CrawlState;
pub use result_set::{FeedEntry, FeedFormat, ResultSet};
