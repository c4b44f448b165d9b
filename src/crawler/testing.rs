//! Scripted in-memory transport for tests
//!
//! Routes are keyed by canonical URI. Unknown URIs answer 404. A route may hold
//! a sequence of replies; each request takes the next one and the last reply
//! repeats once the sequence runs out.

use crate::crawler::fetcher::{FetchResponse, Transport, EFFECTIVE_URI_HEADER};
use crate::url::normalize_url;
use crate::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted outcome
pub type MockReply = Result<FetchResponse, TransportError>;

/// A [`Transport`] that serves canned responses
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<MockReply>>>,
    calls: Mutex<Vec<String>>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every response, so concurrent fetches overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Serves `replies` in order for `uri`
    pub fn script(self, uri: &str, replies: Vec<MockReply>) -> Self {
        self.routes
            .lock()
            .insert(normalize_url(uri), replies.into_iter().collect());
        self
    }

    /// Always serves `response` for `uri`
    pub fn respond(self, uri: &str, response: FetchResponse) -> Self {
        self.script(uri, vec![Ok(response)])
    }

    /// Serves an HTML page
    pub fn page(self, uri: &str, html: &str) -> Self {
        let response = FetchResponse::new(uri, 200)
            .with_content_type("text/html; charset=utf-8")
            .with_body(html);
        self.respond(uri, response)
    }

    /// Serves a feed document with the given content type
    pub fn feed(self, uri: &str, content_type: &str, body: &str) -> Self {
        let response = FetchResponse::new(uri, 200)
            .with_content_type(content_type)
            .with_body(body);
        self.respond(uri, response)
    }

    /// Serves `response` for `from` as if the request had been redirected to `to`
    pub fn redirect(self, from: &str, to: &str, response: FetchResponse) -> Self {
        self.respond(from, response.with_effective_uri(to))
    }

    /// Every requested URI, in request order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of requests made for `uri`
    pub fn calls_to(&self, uri: &str) -> usize {
        let key = normalize_url(uri);
        self.calls
            .lock()
            .iter()
            .filter(|call| normalize_url(call) == key)
            .count()
    }

    /// Highest number of requests that were in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, uri: &str) -> MockReply {
        let mut routes = self.routes.lock();
        let reply = match routes.get_mut(&normalize_url(uri)) {
            Some(replies) if replies.len() > 1 => replies.pop_front(),
            Some(replies) => replies.front().cloned(),
            None => None,
        };

        reply.unwrap_or_else(|| Ok(FetchResponse::new(uri, 404)))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, uri: &str) -> Result<FetchResponse, TransportError> {
        self.calls.lock().push(uri.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let reply = self.next_reply(uri);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        reply.map(|mut response| {
            response.requested_uri = uri.to_string();
            if response.header(EFFECTIVE_URI_HEADER).is_none() {
                response = response.with_effective_uri(uri);
            }
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_uri_is_not_found() {
        let transport = MockTransport::new();
        let response = transport.fetch("http://example.com/nope").await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_script_repeats_last_reply() {
        let uri = "http://example.com/";
        let transport = MockTransport::new().script(
            uri,
            vec![
                Ok(FetchResponse::new(uri, 503)),
                Ok(FetchResponse::new(uri, 200)),
            ],
        );

        assert_eq!(transport.fetch(uri).await.unwrap().status, 503);
        assert_eq!(transport.fetch(uri).await.unwrap().status, 200);
        assert_eq!(transport.fetch(uri).await.unwrap().status, 200);
        assert_eq!(transport.calls_to(uri), 3);
    }

    #[tokio::test]
    async fn test_effective_uri_is_stamped() {
        let transport = MockTransport::new()
            .page("http://example.com/", "<html></html>")
            .redirect(
                "http://example.org/",
                "https://www.example.org/",
                FetchResponse::new("http://example.org/", 200),
            );

        let direct = transport.fetch("http://example.com/").await.unwrap();
        assert_eq!(direct.effective_uri(), "http://example.com/");

        let redirected = transport.fetch("http://example.org/").await.unwrap();
        assert_eq!(redirected.effective_uri(), "https://www.example.org/");
    }
}
