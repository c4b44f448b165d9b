//! URL handling module for Feed Locator
//!
//! This module provides the canonicalizer used for queue deduplication,
//! root-domain extraction, and resolution of scraped links against the page
//! they were found on.

mod domain;
mod normalize;

use url::Url;

// Re-export main functions
pub use domain::{extract_domain, host_in_root_domain, root_domain};
pub use normalize::{normalize_url, request_uri};

/// Resolves a link href against a base URL
///
/// Returns None if the link should be excluded:
/// - empty and fragment-only hrefs
/// - javascript:, mailto:, tel: and data: links
/// - hrefs that cannot be resolved
/// - non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use url::Url;
/// use feed_locator::url::resolve_link;
///
/// let base = Url::parse("http://example.com/blog/").unwrap();
/// let resolved = resolve_link("/feed.xml", &base).unwrap();
/// assert_eq!(resolved.as_str(), "http://example.com/feed.xml");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Returns `scheme://host` for a URL, without port or path
///
/// # Examples
///
/// ```
/// use url::Url;
/// use feed_locator::url::scheme_and_host;
///
/// let url = Url::parse("https://blog.example.com:8443/posts").unwrap();
/// assert_eq!(scheme_and_host(&url), "https://blog.example.com");
/// ```
pub fn scheme_and_host(url: &Url) -> String {
    format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default())
}
