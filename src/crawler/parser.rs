//! HTML document queries
//!
//! Pages are parsed leniently; malformed markup still yields whatever links
//! could be recovered. A parsed [`Document`] cannot be moved between threads,
//! so it only ever lives inside a single synchronous pipeline run.

use scraper::node::Element;
use scraper::{Html, Selector};

/// Hrefs selected by a document query, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMatches {
    pub hrefs: Vec<String>,
}

impl QueryMatches {
    /// Total number of matches
    pub fn count(&self) -> usize {
        self.hrefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hrefs.is_empty()
    }
}

/// A parsed HTML page
pub struct Document {
    html: Html,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}

impl Document {
    /// Parses a response body, replacing invalid UTF-8
    ///
    /// # Example
    ///
    /// ```
    /// use feed_locator::crawler::Document;
    ///
    /// let doc = Document::parse(br#"<a href="/rss">RSS</a>"#);
    /// let matches = doc.select_hrefs("a[href]", |_| true);
    /// assert_eq!(matches.hrefs, vec!["/rss"]);
    /// ```
    pub fn parse(body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        Self {
            html: Html::parse_document(&text),
        }
    }

    /// Returns the `href` of every element matching `selector` for which
    /// `predicate` holds
    ///
    /// Elements without an `href` attribute never match. An invalid selector
    /// matches nothing.
    pub fn select_hrefs<F>(&self, selector: &str, predicate: F) -> QueryMatches
    where
        F: Fn(&Element) -> bool,
    {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::debug!("Invalid selector {:?}: {:?}", selector, e);
                return QueryMatches::default();
            }
        };

        let hrefs = self
            .html
            .select(&selector)
            .map(|element| element.value())
            .filter(|element| predicate(element))
            .filter_map(|element| element.attr("href"))
            .map(str::to_string)
            .collect();

        QueryMatches { hrefs }
    }
}
