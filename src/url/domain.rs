use crate::HostnameError;
use std::net::IpAddr;
use url::Url;

/// Extracts the lower-cased host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use feed_locator::url::extract_domain;
///
/// let url = Url::parse("https://Blog.Example.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the naive registrable root domain (last two labels) of a host
///
/// Hosts with exactly two labels are their own root domain; hosts with a
/// single label cannot be parsed and yield a [`HostnameError`]. IP literals
/// are returned unchanged since they have no domain hierarchy.
///
/// This is a TLD+1 heuristic: multi-part public suffixes are not understood,
/// so `news.example.co.uk` yields `co.uk`.
///
/// # Examples
///
/// ```
/// use feed_locator::url::root_domain;
///
/// assert_eq!(root_domain("blog.example.com").unwrap(), "example.com");
/// assert_eq!(root_domain("example.com").unwrap(), "example.com");
/// assert!(root_domain("localhost").is_err());
/// ```
pub fn root_domain(host: &str) -> Result<String, HostnameError> {
    let host = host.trim_end_matches('.').to_lowercase();

    if is_ip_literal(&host) {
        return Ok(host);
    }

    let labels: Vec<&str> = host.split('.').collect();

    match labels.len() {
        0 | 1 => Err(HostnameError { host }),
        2 => Ok(host),
        n => Ok(labels[n - 2..].join(".")),
    }
}

/// Returns true if `host` is the root domain itself or one of its subdomains
pub fn host_in_root_domain(host: &str, root: &str) -> bool {
    let host = host.trim_end_matches('.').to_lowercase();
    let root = root.to_lowercase();

    host == root || host.ends_with(&format!(".{}", root))
}

fn is_ip_literal(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
}
