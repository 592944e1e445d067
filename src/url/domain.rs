use crate::UrlError;
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use weblens::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the key the robots cache stores a URL under
///
/// This is the lowercase host plus an explicit port, if the URL has one, so
/// two servers on the same host but different ports are kept apart.
pub fn domain_key(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
    let host = extract_domain(&parsed).ok_or(UrlError::MissingDomain)?;
    Ok(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Builds the robots.txt location for the site serving `url`
///
/// # Examples
///
/// ```
/// use weblens::url::robots_url;
///
/// assert_eq!(
///     robots_url("https://Example.com/a/b?c=d").unwrap(),
///     "https://example.com/robots.txt"
/// );
/// ```
pub fn robots_url(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
    let key = domain_key(url)?;
    Ok(format!("{}://{}/robots.txt", parsed.scheme(), key))
}
