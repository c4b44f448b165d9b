//! Configuration module for Feed Locator
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use feed_locator::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("feed-locator.toml")).unwrap();
//! println!("Crawler will keep {} fetches in flight", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, RetryConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
