use crate::UrlError;
use url::Url;

/// Canonicalizes a URL before handler matching
///
/// # Canonicalization Steps
///
/// 1. Trim surrounding whitespace; an empty string is rejected
/// 2. Strip a single trailing `/`, then a single trailing `.`
/// 3. Require a scheme; anything other than `http`/`https` is unsupported
/// 4. Lowercase the scheme and authority, leaving path and query untouched
/// 5. Verify the result still parses and carries a host
///
/// Running this twice yields a different string only for inputs ending in
/// `/.` or `./`, which is why the resolver applies it exactly once.
///
/// # Examples
///
/// ```
/// use weblens::url::canonicalize_url;
///
/// let url = canonicalize_url("  HTTPS://WWW.Example.COM/Some/Path/ ").unwrap();
/// assert_eq!(url, "https://www.example.com/Some/Path");
/// ```
pub fn canonicalize_url(raw: &str) -> Result<String, UrlError> {
    let mut url = raw.trim();
    if url.is_empty() {
        return Err(UrlError::Empty);
    }

    if let Some(stripped) = url.strip_suffix('/') {
        url = stripped;
    }
    if let Some(stripped) = url.strip_suffix('.') {
        url = stripped;
    }

    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| UrlError::Parse(format!("missing scheme in '{}'", url)))?;

    let scheme = scheme.to_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(UrlError::UnsupportedScheme(scheme));
    }

    let split = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(split);
    if authority.is_empty() {
        return Err(UrlError::MissingDomain);
    }

    let canonical = format!("{}://{}{}", scheme, authority.to_lowercase(), tail);

    let parsed = Url::parse(&canonical).map_err(|e| UrlError::Malformed(e.to_string()))?;
    if parsed.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(canonical)
}

/// Removes the `scheme://` part of a URL, if present
///
/// ```
/// use weblens::url::strip_protocol;
///
/// assert_eq!(strip_protocol("https://youtube.com/channel/x"), "youtube.com/channel/x");
/// assert_eq!(strip_protocol("youtube.com"), "youtube.com");
/// ```
pub fn strip_protocol(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    }
}
