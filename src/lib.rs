//! Feed Locator: an ultraliberal syndication feed locator
//!
//! Given a starting web address, this crate discovers the feeds reachable from it:
//! the address itself if it is a feed, feeds advertised through
//! `<link rel="alternate">` autodiscovery markers, and feed-looking anchors on the
//! same host or registrable domain.

pub mod config;
pub mod crawler;
pub mod events;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod url;
pub mod validator;

use thiserror::Error;

/// Main error type for Feed Locator operations
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Hostname(#[from] HostnameError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failures reported by a [`crawler::Transport`]
///
/// HTTP error statuses are not transport errors; they come back as responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed for {uri}: {message}")]
    Connect { uri: String, message: String },

    #[error("Request timeout for {uri}: {message}")]
    Timeout { uri: String, message: String },

    #[error("Request failed for {uri}: {message}")]
    Request { uri: String, message: String },

    #[error("Failed to read body of {uri}: {message}")]
    Body { uri: String, message: String },
}

impl TransportError {
    /// Returns true for failures at the connection level, which are worth retrying.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Timeout { .. })
    }

    /// The URI the failed request was made for
    pub fn uri(&self) -> &str {
        match self {
            Self::Connect { uri, .. }
            | Self::Timeout { uri, .. }
            | Self::Request { uri, .. }
            | Self::Body { uri, .. } => uri,
        }
    }
}

/// Raised when a host has too few labels to derive a root domain from
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot parse \"{host}\" as a hostname")]
pub struct HostnameError {
    pub host: String,
}

/// Result type alias for Feed Locator operations
pub type Result<T> = std::result::Result<T, LocatorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{locate, CrawlReport, CrawlStatus, Scheduler};
pub use state::{FeedEntry, FeedFormat};
pub use url::{normalize_url, root_domain};
