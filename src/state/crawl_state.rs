//! Per-crawl mutable state shared by every pipeline task

use parking_lot::Mutex;

#[derive(Debug)]
struct SourceState {
    source_uri: String,
    first_source: bool,
}

/// Crawl-wide state: the source URI and whether it has been resolved yet
///
/// The source URI starts out as the address the crawl was started with and is
/// replaced, at most once, by the effective URI of the first response to reach
/// the pipeline. Scrape stages read it to decide which hosts are in scope.
#[derive(Debug)]
pub struct CrawlState {
    source: Mutex<SourceState>,
}

impl CrawlState {
    /// Creates crawl state for a crawl starting at `source_uri`
    pub fn new(source_uri: impl Into<String>) -> Self {
        Self {
            source: Mutex::new(SourceState {
                source_uri: source_uri.into(),
                first_source: true,
            }),
        }
    }

    /// Current source URI
    pub fn source_uri(&self) -> String {
        self.source.lock().source_uri.clone()
    }

    /// True until the first effective-URI resolution has been consumed
    pub fn is_first_source(&self) -> bool {
        self.source.lock().first_source
    }

    /// Consumes the first-source flag with the given effective URI
    ///
    /// Only the first call has any effect. If that call's effective URI differs
    /// from the source URI, the source URI is replaced and the previous value
    /// is returned.
    pub fn resolve_source(&self, effective_uri: &str) -> Option<String> {
        let mut source = self.source.lock();

        if !source.first_source {
            return None;
        }
        source.first_source = false;

        if source.source_uri == effective_uri {
            return None;
        }

        Some(std::mem::replace(
            &mut source.source_uri,
            effective_uri.to_string(),
        ))
    }
}
