//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full locate cycle end-to-end over real HTTP.

use feed_locator::config::Config;
use feed_locator::crawler::{HttpTransport, Scheduler, Transport};
use feed_locator::events::RecordingObserver;
use feed_locator::{locate, CrawlStatus, FeedFormat};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Example</title></channel></rss>"#;

const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>Example</title></feed>"#;

const JSON_FEED: &str = r#"{"version": "https://jsonfeed.org/version/1.1", "title": "Example", "items": []}"#;

/// Creates a test configuration with fast retries
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.concurrency = 4;
    config.retry.max_retries = 3;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 10;
    config.user_agent.crawler_name = "TestLocator".to_string();
    config
}

fn transport(config: &Config) -> Arc<dyn Transport> {
    Arc::new(HttpTransport::new(&config.http, &config.user_agent).expect("Failed to build client"))
}

async fn mount_html(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_feed(server: &MockServer, page: &str, content_type: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, content_type),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_autodiscovery_locates_feeds() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><head><title>Blog</title>
            <link rel="alternate" type="application/rss+xml" title="RSS" href="/feed.xml">
            <link rel="alternate" type="application/feed+json" title="JSON" href="/feed.json">
            <link rel="alternate" type="application/json+oembed" href="/oembed">
        </head><body><a href="/about">About</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_feed(&mock_server, "/feed.xml", "application/rss+xml", RSS).await;
    mount_feed(&mock_server, "/feed.json", "application/feed+json", JSON_FEED).await;

    let report = locate(&format!("{}/", base_url), &create_test_config())
        .await
        .expect("Locate failed");

    assert_eq!(report.status, CrawlStatus::Complete);
    assert_eq!(report.feeds.len(), 2);

    let mut found: Vec<_> = report
        .feeds
        .iter()
        .map(|feed| (feed.effective_uri.clone(), feed.format))
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        found,
        vec![
            (format!("{}/feed.json", base_url), FeedFormat::JsonFeed),
            (format!("{}/feed.xml", base_url), FeedFormat::Rss),
        ]
    );

    // The oEmbed alternate link is never requested
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| r.url.path() != "/oembed"));
}

#[tokio::test]
async fn test_source_is_a_feed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/atom"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(ATOM, "application/atom+xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = locate(&format!("{}/atom", base_url), &create_test_config())
        .await
        .expect("Locate failed");

    assert_eq!(report.feeds.len(), 1);
    assert_eq!(report.feeds[0].format, FeedFormat::Atom);
    assert_eq!(report.feeds[0].content_type, "application/atom+xml");
    assert_eq!(report.uris_visited, 1);
}

#[tokio::test]
async fn test_redirect_updates_source_uri() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/home", base_url)),
        )
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/home",
        r#"<html><body><a href="/rss">Subscribe</a></body></html>"#.to_string(),
    )
    .await;
    mount_feed(&mock_server, "/rss", "text/xml", RSS).await;

    let config = create_test_config();
    let observer = Arc::new(RecordingObserver::new());
    let report = Scheduler::from_config(transport(&config), &config)
        .with_observer(observer.clone())
        .run(&format!("{}/old", base_url))
        .await;

    assert_eq!(report.source_uri, format!("{}/home", base_url));
    assert_eq!(observer.events_of("source_updated").len(), 1);
    assert_eq!(report.feeds.len(), 1);
    assert_eq!(report.feeds[0].effective_uri, format!("{}/rss", base_url));
}

#[tokio::test]
async fn test_out_of_domain_links_are_not_followed() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        r#"<html><body>
            <a href="http://feeds.other.invalid/rss?via=127.0.0.1">Elsewhere</a>
            <a href="/feed">Local</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_feed(&mock_server, "/feed", "application/rss+xml", RSS).await;

    let config = create_test_config();
    let observer = Arc::new(RecordingObserver::new());
    let report = Scheduler::from_config(transport(&config), &config)
        .with_observer(observer.clone())
        .run(&format!("{}/", mock_server.uri()))
        .await;

    assert_eq!(report.feeds.len(), 1);
    assert_eq!(report.uris_visited, 2);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(observer.events_of("link_rejected").len(), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_feed(&mock_server, "/feed", "application/rss+xml", RSS).await;

    let config = create_test_config();
    let observer = Arc::new(RecordingObserver::new());
    let report = Scheduler::from_config(transport(&config), &config)
        .with_observer(observer.clone())
        .run(&format!("{}/feed", mock_server.uri()))
        .await;

    assert_eq!(report.feeds.len(), 1);
    assert_eq!(observer.events_of("retrying").len(), 2);
}

#[tokio::test]
async fn test_persistent_server_error_gives_up() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&mock_server)
        .await;

    let report = locate(&format!("{}/down", mock_server.uri()), &create_test_config())
        .await
        .expect("Locate failed");

    assert_eq!(report.status, CrawlStatus::Complete);
    assert!(report.feeds.is_empty());
    assert_eq!(report.fetch_failures, 1);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let observer = Arc::new(RecordingObserver::new());
    let report = Scheduler::from_config(transport(&config), &config)
        .with_observer(observer.clone())
        .run(&format!("{}/missing", mock_server.uri()))
        .await;

    assert_eq!(report.status, CrawlStatus::Complete);
    assert!(observer.events_of("retrying").is_empty());
    assert_eq!(observer.events_of("fetched").len(), 1);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(report.pages_fetched, 1);
    assert!(report.feeds.is_empty());
}

#[tokio::test]
async fn test_client_error_is_a_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let response = transport(&config)
        .fetch(&format!("{}/gone", mock_server.uri()))
        .await
        .expect("A 410 is a response, not an error");

    assert_eq!(response.status, 410);
    assert!(!response.is_server_error());
}

#[tokio::test]
async fn test_transport_stamps_effective_uri() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/end", base_url)),
        )
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/end", "<html></html>".to_string()).await;

    let config = create_test_config();
    let response = transport(&config)
        .fetch(&format!("{}/start", base_url))
        .await
        .expect("Fetch failed");

    assert_eq!(response.requested_uri, format!("{}/start", base_url));
    assert_eq!(response.effective_uri(), format!("{}/end", base_url));
    assert_eq!(response.content_type(), "text/html; charset=utf-8");
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(wiremock::matchers::header_regex(
            "user-agent",
            r"^TestLocator/\S+ \(\+https?://\S+\)$",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let response = transport(&config)
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_invalid_source_uri_is_rejected() {
    let result = locate("not a url", &create_test_config()).await;
    assert!(matches!(result, Err(feed_locator::LocatorError::UrlParse(_))));
}
