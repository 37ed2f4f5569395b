use url::Url;

const TIKTOK_DOMAIN: &str = "tiktok.com";

pub fn is_valid_http_url(url: &str) -> bool {
    if let Ok(parsed) = Url::parse(url) {
        let scheme = parsed.scheme();
        let host = parsed.host_str().unwrap_or("");
        (scheme == "http" || scheme == "https") && !host.is_empty()
    } else {
        false
    }
}

/// True when the URL's host is `tiktok.com` or one of its subdomains
/// (www., vm., m. ...). Path and query are ignored.
pub fn is_tiktok_url(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_ascii_lowercase()))
        .is_some_and(|host| {
            host == TIKTOK_DOMAIN
                || host
                    .strip_suffix(TIKTOK_DOMAIN)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
}
