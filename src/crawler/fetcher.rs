//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - Following redirects and recording the effective URI
//! - Returning error statuses as responses so retries can tell them apart
//!   from connection failures
//! - Error classification

use crate::config::{HttpConfig, UserAgentConfig};
use crate::TransportError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};

/// Header the transport stamps with the final URI after following redirects
pub const EFFECTIVE_URI_HEADER: &str = "x-effective-uri";

/// A fully-read HTTP response
///
/// The body is held in memory, so any number of readers can scan it from the
/// start.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URI that was requested
    pub requested_uri: String,

    /// HTTP status code
    pub status: u16,

    /// Response headers, including [`EFFECTIVE_URI_HEADER`]
    pub headers: HeaderMap,

    /// Response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Creates an empty response for `requested_uri`
    pub fn new(requested_uri: impl Into<String>, status: u16) -> Self {
        Self {
            requested_uri: requested_uri.into(),
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header; invalid names or values are ignored
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the `content-type` header
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(content_type) {
            self.headers.insert(CONTENT_TYPE, value);
        }
        self
    }

    /// Records the URI the response was actually served from
    pub fn with_effective_uri(mut self, uri: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(uri) {
            self.headers
                .insert(HeaderName::from_static(EFFECTIVE_URI_HEADER), value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Last value of a header, if present and valid text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(name)
            .iter()
            .last()
            .and_then(|v| v.to_str().ok())
    }

    /// The URI the response was served from, falling back to the requested URI
    pub fn effective_uri(&self) -> &str {
        self.header(EFFECTIVE_URI_HEADER)
            .unwrap_or(&self.requested_uri)
    }

    /// The `content-type` header, or an empty string
    pub fn content_type(&self) -> &str {
        self.header(CONTENT_TYPE.as_str()).unwrap_or("")
    }

    /// At most the first `max` bytes of the body
    pub fn body_prefix(&self, max: usize) -> &[u8] {
        &self.body[..self.body.len().min(max)]
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Fetches URIs for the crawler
///
/// Implementations must follow redirects, populate [`EFFECTIVE_URI_HEADER`],
/// and return HTTP error statuses as responses rather than errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<FetchResponse, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use feed_locator::config::{HttpConfig, UserAgentConfig};
/// use feed_locator::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    http: &HttpConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .redirect(Policy::limited(http.max_redirects))
        .cookie_store(http.cookies)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(http: &HttpConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(http, user_agent)?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, uri: &str) -> Result<FetchResponse, TransportError> {
        let started = Instant::now();
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| classify_error(uri, &e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body {
                uri: uri.to_string(),
                message: e.to_string(),
            })?;

        let mut fetched = FetchResponse {
            requested_uri: uri.to_string(),
            status,
            headers,
            body: body.to_vec(),
        };
        fetched = fetched.with_effective_uri(&final_url);

        tracing::debug!(
            status,
            effective_uri = %final_url,
            bytes = fetched.body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched {}", uri
        );

        Ok(fetched)
    }
}

/// Maps a `reqwest` error onto the transport error taxonomy
fn classify_error(uri: &str, error: &reqwest::Error) -> TransportError {
    let uri = uri.to_string();
    let message = error.to_string();

    if error.is_timeout() {
        TransportError::Timeout { uri, message }
    } else if error.is_connect() {
        TransportError::Connect { uri, message }
    } else {
        TransportError::Request { uri, message }
    }
}
