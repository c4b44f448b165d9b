use url::Url;

/// Normalizes a URI string into the canonical key used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URI (scheme and host are lower-cased, default ports dropped,
///    dot segments removed and an empty path becomes `/` as part of parsing)
/// 2. Remove the fragment
/// 3. Upper-case percent-escape hex digits and decode escaped unreserved characters
/// 4. Remove trailing slashes (except for the root `/`)
///
/// Input that does not parse as an absolute URI is returned trimmed and without
/// its fragment rather than rejected, so this never fails.
///
/// # Examples
///
/// ```
/// use feed_locator::url::normalize_url;
///
/// assert_eq!(normalize_url("HTTP://Example.COM:80/feed/#top"), "http://example.com/feed");
/// assert_eq!(normalize_url("http://example.com"), "http://example.com/");
/// ```
pub fn normalize_url(uri: &str) -> String {
    let trimmed = uri.trim();

    match Url::parse(trimmed) {
        Ok(url) => canonicalize(url),
        Err(_) => strip_fragment(trimmed).to_string(),
    }
}

/// Prepares a URI for fetching
///
/// The URI is re-serialized without its fragment. Unlike [`normalize_url`] the
/// path is left as written, so `http://example.com/blog/` keeps its trailing
/// slash and relative links on that page resolve under `/blog/`.
///
/// ```
/// use feed_locator::url::request_uri;
///
/// assert_eq!(request_uri("http://Example.com/blog/#top"), "http://example.com/blog/");
/// assert_eq!(request_uri("http://example.com"), "http://example.com/");
/// ```
pub fn request_uri(uri: &str) -> String {
    let trimmed = uri.trim();

    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => strip_fragment(trimmed).to_string(),
    }
}

fn canonicalize(mut url: Url) -> String {
    url.set_fragment(None);

    // mailto:, data: and friends have no hierarchical path to normalize
    if url.cannot_be_a_base() {
        return url.to_string();
    }

    let path = normalize_percent_encoding(url.path());
    url.set_path(&path);

    let path = strip_trailing_slashes(url.path());
    url.set_path(&path);

    if let Some(query) = url.query() {
        let query = normalize_percent_encoding(query);
        url.set_query(Some(&query));
    }

    url.to_string()
}

fn strip_fragment(uri: &str) -> &str {
    uri.split('#').next().unwrap_or(uri)
}

fn strip_trailing_slashes(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Rewrites percent-escapes in an ASCII serialization: escapes of unreserved
/// characters are decoded, all other escapes get upper-case hex digits.
fn normalize_percent_encoding(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                let decoded = hi * 16 + lo;
                if is_unreserved(decoded) {
                    out.push(char::from(decoded));
                } else {
                    out.push('%');
                    out.push(char::from(bytes[i + 1].to_ascii_uppercase()));
                    out.push(char::from(bytes[i + 2].to_ascii_uppercase()));
                }
                i += 3;
                continue;
            }
        }

        out.push(char::from(bytes[i]));
        i += 1;
    }

    out
}

fn hex_value(byte: u8) -> Option<u8> {
    char::from(byte).to_digit(16).map(|d| d as u8)
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}
