//! Feed formats and the result set of located feeds

use crate::url::normalize_url;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;

/// The syndication format a located feed was identified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedFormat {
    Rss,
    Atom,
    Rdf,
    JsonFeed,
}

impl FeedFormat {
    /// All formats in validation priority order
    pub const PRIORITY: [FeedFormat; 4] = [Self::Rss, Self::Atom, Self::Rdf, Self::JsonFeed];

    /// Short lowercase name of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rss => "rss",
            Self::Atom => "atom",
            Self::Rdf => "rdf",
            Self::JsonFeed => "jsonfeed",
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated feed: where it was served from, what it is and how it was labelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// URI the feed was actually served from, after redirects
    pub effective_uri: String,

    /// Identified feed format
    pub format: FeedFormat,

    /// Content-Type header the server sent (may be empty)
    pub content_type: String,
}

impl FeedEntry {
    pub fn new(
        effective_uri: impl Into<String>,
        format: FeedFormat,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            effective_uri: effective_uri.into(),
            format,
            content_type: content_type.into(),
        }
    }
}

#[derive(Debug, Default)]
struct ResultSetInner {
    entries: Vec<FeedEntry>,
    seen: HashSet<String>,
}

/// Append-only, insertion-ordered collection of located feeds
///
/// Shared between concurrently running pipeline tasks; every mutation goes
/// through a single lock. Entries are never removed or modified. Two queue
/// entries that redirect to the same feed produce one entry: a feed whose
/// canonical effective URI is already recorded is not appended again.
#[derive(Debug, Default)]
pub struct ResultSet {
    inner: Mutex<ResultSetInner>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, returning false if the same feed was already recorded
    pub fn push(&self, entry: FeedEntry) -> bool {
        let key = normalize_url(&entry.effective_uri);
        let mut inner = self.inner.lock();

        if !inner.seen.insert(key) {
            return false;
        }

        inner.entries.push(entry);
        true
    }

    /// Number of recorded feeds
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the recorded feeds, in the order they were found
    pub fn snapshot(&self) -> Vec<FeedEntry> {
        self.inner.lock().entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_push_preserves_order() {
        let results = ResultSet::new();
        assert!(results.push(FeedEntry::new(
            "http://example.com/rss",
            FeedFormat::Rss,
            "application/rss+xml"
        )));
        assert!(results.push(FeedEntry::new(
            "http://example.com/atom",
            FeedFormat::Atom,
            "application/atom+xml"
        )));

        let entries = results.snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].format, FeedFormat::Rss);
        assert_eq!(entries[1].format, FeedFormat::Atom);
    }

    #[test]
    fn test_same_feed_recorded_once() {
        let results = ResultSet::new();
        assert!(results.push(FeedEntry::new(
            "http://example.com/feed/",
            FeedFormat::Rss,
            "text/xml"
        )));
        assert!(!results.push(FeedEntry::new(
            "http://example.com:80/feed",
            FeedFormat::Rss,
            "text/xml"
        )));
        assert_eq!(results.len(), 1);
        assert_eq!(results.snapshot()[0].effective_uri, "http://example.com/feed/");
    }

    #[test]
    fn test_concurrent_pushes() {
        let results = Arc::new(ResultSet::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let results = Arc::clone(&results);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        results.push(FeedEntry::new(
                            format!("http://example.com/{}/{}", i, j),
                            FeedFormat::Atom,
                            "",
                        ));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(results.len(), 400);
    }

    #[test]
    fn test_format_priority_order() {
        assert_eq!(
            FeedFormat::PRIORITY,
            [
                FeedFormat::Rss,
                FeedFormat::Atom,
                FeedFormat::Rdf,
                FeedFormat::JsonFeed
            ]
        );
        assert_eq!(FeedFormat::JsonFeed.to_string(), "jsonfeed");
    }
}
