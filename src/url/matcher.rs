/// Checks if a domain matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches the bare domain and any subdomain
///
/// # Examples
///
/// ```
/// use weblens::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "other.com"));
///
/// assert!(matches_wildcard("*.youtube.com", "youtube.com"));
/// assert!(matches_wildcard("*.youtube.com", "m.youtube.com"));
/// assert!(!matches_wildcard("*.youtube.com", "notyoutube.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// A host pattern plus a path prefix, e.g. `*.youtube.com/channel/`
///
/// Rules are evaluated against a protocol-stripped URL. The host part uses
/// [`matches_wildcard`]; the remainder must start with the rule's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRule {
    host: &'static str,
    prefix: &'static str,
}

impl PathRule {
    /// Creates a rule from a host pattern and a path prefix starting with `/`
    pub const fn new(host: &'static str, prefix: &'static str) -> Self {
        Self { host, prefix }
    }

    pub fn host(&self) -> &'static str {
        self.host
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Tests a protocol-stripped URL such as `www.youtube.com/channel/UC123`
    pub fn matches(&self, stripped: &str) -> bool {
        let split = stripped.find(['/', '?', '#']).unwrap_or(stripped.len());
        let (host, rest) = stripped.split_at(split);
        let host = host.split(':').next().unwrap_or(host);
        matches_wildcard(self.host, host) && rest.starts_with(self.prefix)
    }
}

/// Returns the index of the first rule matching `stripped`
///
/// Rules are checked in order and the first hit wins.
pub fn first_matching_rule(rules: &[PathRule], stripped: &str) -> Option<usize> {
    rules.iter().position(|rule| rule.matches(stripped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_wildcard("example.com", "example.com"));
        assert!(!matches_wildcard("example.com", "blog.example.com"));
    }

    #[test]
    fn test_wildcard_matches_nested_subdomains() {
        assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
    }

    #[test]
    fn test_wildcard_no_match_partial() {
        assert!(!matches_wildcard("*.example.com", "myexample.com"));
        assert!(!matches_wildcard("*.example.com", "example.com.org"));
    }

    #[test]
    fn test_empty_strings() {
        assert!(!matches_wildcard("*.example.com", ""));
        assert!(!matches_wildcard("", "example.com"));
    }

    #[test]
    fn test_path_rule_matches_host_variants() {
        let rule = PathRule::new("*.youtube.com", "/channel/");
        assert!(rule.matches("youtube.com/channel/UC123"));
        assert!(rule.matches("www.youtube.com/channel/UC123"));
        assert!(rule.matches("m.youtube.com/channel/UC123"));
        assert!(!rule.matches("www.youtube.com/watch?v=123"));
        assert!(!rule.matches("notyoutube.com/channel/UC123"));
    }

    #[test]
    fn test_path_rule_with_query_prefix() {
        let rule = PathRule::new("*.youtube.com", "/watch?v=");
        assert!(rule.matches("www.youtube.com/watch?v=abc"));
        assert!(!rule.matches("www.youtube.com/watch"));
    }

    #[test]
    fn test_path_rule_ignores_port() {
        let rule = PathRule::new("odysee.com", "/@");
        assert!(rule.matches("odysee.com:443/@channel:7"));
    }

    #[test]
    fn test_path_rule_bare_host() {
        let rule = PathRule::new("youtu.be", "/");
        assert!(rule.matches("youtu.be/abc"));
        assert!(!rule.matches("youtu.be"));
    }

    #[test]
    fn test_first_matching_rule_order() {
        let rules = [
            PathRule::new("*.youtube.com", "/channel/"),
            PathRule::new("*.youtube.com", "/"),
        ];
        assert_eq!(first_matching_rule(&rules, "youtube.com/channel/x"), Some(0));
        assert_eq!(first_matching_rule(&rules, "youtube.com/about"), Some(1));
        assert_eq!(first_matching_rule(&rules, "example.com/about"), None);
    }
}
