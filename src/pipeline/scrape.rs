//! Fallback scraping of feed-looking anchors

use super::{Stage, StageContext, StageError, StageInput, StageOutcome};
use crate::events::CrawlEvent;
use crate::url::{extract_domain, host_in_root_domain, resolve_link, root_domain, scheme_and_host};
use url::Url;

/// Substrings that make an anchor's href look like a feed
pub const FEED_KEYWORDS: &[&str] = &["atom", "feed", "rdf", "rss", "xml"];

/// Which anchors a [`Scrape`] stage considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeMode {
    /// Hrefs that are root-relative or start with the page's `scheme://host`
    SameDomain,

    /// Hrefs that mention the source URI's root domain anywhere
    RootDomain,
}

/// Queues feed-looking anchors that stay within the source root domain
///
/// The candidate query depends on the mode. Either way, a candidate is only
/// queued if its resolved host is the source root domain or a subdomain of it.
#[derive(Debug, Clone, Copy)]
pub struct Scrape {
    mode: ScrapeMode,
}

impl Scrape {
    pub fn new(mode: ScrapeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ScrapeMode {
        self.mode
    }
}

fn has_feed_keyword(href: &str) -> bool {
    let href = href.to_ascii_lowercase();
    FEED_KEYWORDS.iter().any(|keyword| href.contains(keyword))
}

impl Stage for Scrape {
    fn name(&self) -> &'static str {
        match self.mode {
            ScrapeMode::SameDomain => "scrape-same-domain",
            ScrapeMode::RootDomain => "scrape-root-domain",
        }
    }

    fn process(
        &self,
        input: &StageInput<'_>,
        ctx: &StageContext,
    ) -> Result<StageOutcome, StageError> {
        let effective = input.effective_url()?;
        let effective_prefix = scheme_and_host(&effective);

        let source_host = Url::parse(&ctx.state.source_uri())
            .ok()
            .and_then(|url| extract_domain(&url))
            .unwrap_or_default();
        let source_root = root_domain(&source_host)?;

        let matches = input.document().select_hrefs("a[href]", |anchor| {
            let Some(href) = anchor.attr("href") else {
                return false;
            };

            let in_scope = match self.mode {
                ScrapeMode::SameDomain => {
                    href.starts_with(&effective_prefix) || href.starts_with('/')
                }
                ScrapeMode::RootDomain => href.to_ascii_lowercase().contains(&source_root),
            };

            in_scope && has_feed_keyword(href)
        });

        tracing::debug!(
            mode = ?self.mode,
            matches = matches.count(),
            "Scrape query"
        );

        for href in &matches.hrefs {
            let Some(link) = resolve_link(href, &effective) else {
                continue;
            };
            let link_host = extract_domain(&link).unwrap_or_default();

            if host_in_root_domain(&link_host, &source_root) {
                ctx.enqueue(self.name(), &link);
            } else {
                ctx.observer.observe(&CrawlEvent::LinkRejected {
                    stage: self.name(),
                    uri: link.to_string(),
                    host: link_host,
                    root_domain: source_root.clone(),
                });
            }
        }

        Ok(StageOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{context, html};

    const PAGE: &str = r#"<html><body>
        <a href="http://example.com/rss">RSS</a>
        <a href="http://other.org/rss">Elsewhere</a>
        <a href="/feed/atom">Atom</a>
        <a href="/about">About</a>
        <a href="http://news.example.com/feed.xml">News feed</a>
        <a href="http://other.org/rss?ref=example.com">Tracking</a>
    </body></html>"#;

    #[test]
    fn test_keywords() {
        assert!(has_feed_keyword("/blog/feed"));
        assert!(has_feed_keyword("/index.RDF"));
        assert!(has_feed_keyword("sitemap.xml"));
        assert!(!has_feed_keyword("/about"));
    }

    #[test]
    fn test_same_domain_mode() {
        let (ctx, observer) = context("http://example.com/");
        let response = html("http://example.com/", PAGE);

        Scrape::new(ScrapeMode::SameDomain)
            .process(&StageInput::new(&response), &ctx)
            .unwrap();

        assert_eq!(
            ctx.queue.pending(),
            vec!["http://example.com/rss", "http://example.com/feed/atom"]
        );
        assert!(observer.events_of("link_rejected").is_empty());
    }

    #[test]
    fn test_root_domain_mode() {
        let (ctx, observer) = context("http://example.com/");
        let response = html("http://example.com/", PAGE);

        Scrape::new(ScrapeMode::RootDomain)
            .process(&StageInput::new(&response), &ctx)
            .unwrap();

        assert_eq!(
            ctx.queue.pending(),
            vec!["http://example.com/rss", "http://news.example.com/feed.xml"]
        );

        let rejected = observer.events_of("link_rejected");
        assert_eq!(rejected.len(), 1);
        match &rejected[0] {
            CrawlEvent::LinkRejected {
                host, root_domain, ..
            } => {
                assert_eq!(host, "other.org");
                assert_eq!(root_domain, "example.com");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_scope_follows_updated_source() {
        let (ctx, _) = context("http://example.com/");
        ctx.state.resolve_source("https://www.example.net/");
        let response = html(
            "https://www.example.net/",
            r#"<a href="https://blog.example.net/rss">RSS</a>
               <a href="http://example.com/rss">Old home</a>"#,
        );

        Scrape::new(ScrapeMode::RootDomain)
            .process(&StageInput::new(&response), &ctx)
            .unwrap();

        assert_eq!(ctx.queue.pending(), vec!["https://blog.example.net/rss"]);
    }

    #[test]
    fn test_protocol_relative_offsite_link_is_rejected() {
        let (ctx, observer) = context("https://example.com/");
        let response = html("https://example.com/", r#"<a href="//cdn.other.org/feed">Feed</a>"#);

        Scrape::new(ScrapeMode::SameDomain)
            .process(&StageInput::new(&response), &ctx)
            .unwrap();

        assert!(ctx.queue.is_empty());
        assert_eq!(observer.events_of("link_rejected").len(), 1);
    }

    #[test]
    fn test_single_label_source_fails() {
        let (ctx, _) = context("http://intranet/");
        let response = html("http://intranet/", r#"<a href="/rss">RSS</a>"#);

        let err = Scrape::new(ScrapeMode::RootDomain)
            .process(&StageInput::new(&response), &ctx)
            .unwrap_err();

        assert!(matches!(err, StageError::Hostname(_)));
    }

    #[test]
    fn test_ip_source_is_its_own_root() {
        let (ctx, _) = context("http://127.0.0.1:8080/");
        let response = html(
            "http://127.0.0.1:8080/",
            r#"<a href="/feed.xml">Feed</a>"#,
        );

        Scrape::new(ScrapeMode::SameDomain)
            .process(&StageInput::new(&response), &ctx)
            .unwrap();

        assert_eq!(ctx.queue.pending(), vec!["http://127.0.0.1:8080/feed.xml"]);
    }
}
