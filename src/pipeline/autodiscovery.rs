//! `<link rel="alternate">` feed autodiscovery

use super::{Stage, StageContext, StageError, StageInput, StageOutcome};
use crate::url::resolve_link;

pub const ATOM_TYPES: &[&str] = &["application/atom+xml"];

pub const JSON_TYPES: &[&str] = &["application/json", "application/feed+json"];

pub const RDF_TYPES: &[&str] = &[
    "application/rdf",
    "application/rdf+xml",
    "application/x-rdf",
    "application/x-rdf+xml",
    "text/rdf",
    "text/rdf+xml",
    "text/x-rdf",
    "text/x-rdf+xml",
];

pub const RSS_TYPES: &[&str] = &[
    "application/rss",
    "application/rss+xml",
    "application/x-rss",
    "application/x-rss+xml",
    "text/rss",
    "text/rss+xml",
    "text/x-rss",
    "text/x-rss+xml",
];

/// Generic XML media types, accepted alongside the XML feed types
pub const GENERIC_XML_TYPES: &[&str] = &[
    "application/xml",
    "application/x-xml",
    "text/xml",
    "text/x-xml",
];

/// A `type` containing any of these is never a feed, even if it also
/// contains a feed media type
pub const EXCLUDED_TYPE_FRAGMENTS: &[&str] = &[
    "dtd",
    "external-parsed-entity",
    "oembed",
    "xhtml",
    "xml-patch",
];

/// Every media type that marks an alternate link as a feed
pub fn feed_media_types() -> impl Iterator<Item = &'static str> {
    JSON_TYPES
        .iter()
        .chain(ATOM_TYPES)
        .chain(RDF_TYPES)
        .chain(RSS_TYPES)
        .chain(GENERIC_XML_TYPES)
        .copied()
}

/// True if a link `type` attribute advertises a feed
pub fn is_feed_media_type(type_attr: &str) -> bool {
    let type_attr = type_attr.to_ascii_lowercase();

    feed_media_types().any(|media_type| type_attr.contains(media_type))
        && !EXCLUDED_TYPE_FRAGMENTS
            .iter()
            .any(|fragment| type_attr.contains(fragment))
}

fn is_alternate(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("alternate"))
}

/// Queues every feed advertised with `<link rel="alternate" type="...">`
///
/// Advertised feeds are followed wherever they are hosted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Autodiscovery;

impl Stage for Autodiscovery {
    fn name(&self) -> &'static str {
        "autodiscovery"
    }

    fn process(
        &self,
        input: &StageInput<'_>,
        ctx: &StageContext,
    ) -> Result<StageOutcome, StageError> {
        let base = input.effective_url()?;

        let matches = input.document().select_hrefs("link[href]", |link| {
            link.attr("rel").is_some_and(is_alternate)
                && link.attr("type").is_some_and(is_feed_media_type)
        });

        tracing::debug!(matches = matches.count(), "Autodiscovery query");

        for href in &matches.hrefs {
            if let Some(link) = resolve_link(href, &base) {
                ctx.enqueue(self.name(), &link);
            }
        }

        Ok(StageOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{context, html};

    #[test]
    fn test_feed_media_types() {
        assert!(is_feed_media_type("application/rss+xml"));
        assert!(is_feed_media_type("Application/Atom+XML"));
        assert!(is_feed_media_type("application/feed+json"));
        assert!(is_feed_media_type("text/xml"));
        assert!(!is_feed_media_type("text/html"));
        assert!(!is_feed_media_type("text/css"));
    }

    #[test]
    fn test_excluded_fragments_win() {
        assert!(!is_feed_media_type("application/json+oembed"));
        assert!(!is_feed_media_type("text/xml+oembed"));
        assert!(!is_feed_media_type("application/xhtml+xml"));
        assert!(!is_feed_media_type("application/xml-dtd"));
        assert!(!is_feed_media_type("application/xml-patch+xml"));
        assert!(!is_feed_media_type("application/xml-external-parsed-entity"));
    }

    #[test]
    fn test_alternate_links_are_queued() {
        let (ctx, observer) = context("https://blog.example.com/");
        let response = html(
            "https://blog.example.com/posts/",
            r#"<html><head>
                <link rel="alternate" type="application/rss+xml" href="feed.rss">
                <link rel="alternate" type="application/atom+xml" href="https://feeds.other.org/atom">
                <link rel="alternate" type="application/json+oembed" href="/oembed?url=x">
                <link rel="alternate" type="text/html" hreflang="fr" href="/fr/">
                <link rel="stylesheet" type="text/css" href="/style.css">
                <link rel="alternate" href="/untyped">
            </head><body></body></html>"#,
        );

        Autodiscovery
            .process(&StageInput::new(&response), &ctx)
            .unwrap();

        assert_eq!(
            ctx.queue.pending(),
            vec![
                "https://blog.example.com/posts/feed.rss",
                "https://feeds.other.org/atom"
            ]
        );
        assert_eq!(observer.events_of("link_enqueued").len(), 2);
    }

    #[test]
    fn test_rel_tokens_are_case_insensitive() {
        let (ctx, _) = context("http://example.com/");
        let response = html(
            "http://example.com/",
            r#"<link rel="Alternate home" type="application/rss+xml" href="/rss">"#,
        );

        Autodiscovery
            .process(&StageInput::new(&response), &ctx)
            .unwrap();

        assert!(ctx.queue.is_pending("http://example.com/rss"));
    }

    #[test]
    fn test_invalid_effective_uri_fails() {
        let (ctx, _) = context("http://example.com/");
        let response = crate::crawler::FetchResponse::new("not a uri", 200);

        let err = Autodiscovery
            .process(&StageInput::new(&response), &ctx)
            .unwrap_err();

        assert!(matches!(err, StageError::InvalidUri { .. }));
    }
}
