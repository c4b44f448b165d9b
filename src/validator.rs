//! Feed validators
//!
//! Each validator decides from a response alone whether it is a feed of one
//! format. XML and JSON formats are recognised by sniffing a short prefix of
//! the body, since servers label feeds inconsistently. RDF is recognised by its
//! content type only.

use crate::crawler::FetchResponse;
use crate::state::FeedFormat;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use std::sync::LazyLock;

/// Bytes of body scanned for an `<rss>` root element
pub const RSS_SCAN_BYTES: usize = 500;

/// Bytes of body scanned for an Atom `<feed>` root element
pub const ATOM_SCAN_BYTES: usize = 500;

/// Bytes of body scanned for the JSON Feed version URI
pub const JSON_FEED_SCAN_BYTES: usize = 100;

static RSS_ROOT: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r"(?im)<rss\s?([^>]*)>").expect("RSS pattern is valid")
});

static ATOM_ROOT: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r"(?im)<feed\s?([^>]*)http://www\.w3\.org/2005/Atom([^>]*)>")
        .expect("Atom pattern is valid")
});

static JSON_FEED_VERSION: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r"(?i)https://jsonfeed\.org/version/1").expect("JSON Feed pattern is valid")
});

static RDF_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(application|text)/(x-)?rdf(\+xml)?").expect("RDF pattern is valid")
});

/// True if the body opens with an `<rss>` element
pub fn is_rss(response: &FetchResponse) -> bool {
    RSS_ROOT.is_match(response.body_prefix(RSS_SCAN_BYTES))
}

/// True if the body opens with a `<feed>` element in the Atom namespace
pub fn is_atom(response: &FetchResponse) -> bool {
    ATOM_ROOT.is_match(response.body_prefix(ATOM_SCAN_BYTES))
}

/// True if the content type is one of the RDF media types
pub fn is_rdf(response: &FetchResponse) -> bool {
    RDF_CONTENT_TYPE.is_match(response.content_type())
}

/// True if the body mentions the JSON Feed version URI near the top
pub fn is_json_feed(response: &FetchResponse) -> bool {
    JSON_FEED_VERSION.is_match(response.body_prefix(JSON_FEED_SCAN_BYTES))
}

/// Runs the validator for one format
pub fn is_feed(format: FeedFormat, response: &FetchResponse) -> bool {
    match format {
        FeedFormat::Rss => is_rss(response),
        FeedFormat::Atom => is_atom(response),
        FeedFormat::Rdf => is_rdf(response),
        FeedFormat::JsonFeed => is_json_feed(response),
    }
}

/// Identifies the format of a response, trying formats in priority order
///
/// Returns the first format whose validator accepts the response.
///
/// # Example
///
/// ```
/// use feed_locator::crawler::FetchResponse;
/// use feed_locator::validator::identify;
/// use feed_locator::FeedFormat;
///
/// let response = FetchResponse::new("http://example.com/feed", 200)
///     .with_body(r#"<?xml version="1.0"?><rss version="2.0"><channel/></rss>"#);
/// assert_eq!(identify(&response), Some(FeedFormat::Rss));
/// ```
pub fn identify(response: &FetchResponse) -> Option<FeedFormat> {
    FeedFormat::PRIORITY
        .into_iter()
        .find(|format| is_feed(*format, response))
}
