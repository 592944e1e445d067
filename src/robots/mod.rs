//! Robots.txt policy
//!
//! [`DomainCache`] keeps one [`DomainInfo`] per domain. Robots files are not
//! fetched here; the cache asks an injected [`RobotsSource`], which the
//! resolver implements on top of its own handler machinery.

mod cache;
mod parser;

pub use cache::{CachedDomain, DomainCache, DEFAULT_CAPACITY, STALE_AFTER_HOURS};
pub use parser::ParsedRobots;

use async_trait::async_trait;

/// User agent whose rules are applied
pub const ROBOTS_USER_AGENT: &str = "*";

/// Fetches robots.txt bodies for the cache
#[async_trait]
pub trait RobotsSource: Send + Sync {
    /// Body of the robots file, or `None` when it could not be fetched
    async fn fetch_robots(&self, robots_url: &str) -> Option<String>;
}

/// Robots policy of one domain
#[derive(Debug, Clone)]
pub struct DomainInfo {
    domain: String,
    robots_url: String,
    robots: ParsedRobots,
}

impl DomainInfo {
    pub fn new(domain: impl Into<String>, robots_url: impl Into<String>, robots: ParsedRobots) -> Self {
        Self {
            domain: domain.into(),
            robots_url: robots_url.into(),
            robots,
        }
    }

    /// Policy that allows everything, used when robots are not respected
    pub fn allow_all(domain: impl Into<String>, robots_url: impl Into<String>) -> Self {
        Self::new(domain, robots_url, ParsedRobots::allow_all())
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn robots_url(&self) -> &str {
        &self.robots_url
    }

    pub fn robots(&self) -> &ParsedRobots {
        &self.robots
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.robots.is_allowed(url, ROBOTS_USER_AGENT)
    }

    pub fn site_maps(&self) -> &[String] {
        self.robots.sitemaps()
    }

    /// Absolute URLs of the literal paths named by allow/disallow rules
    pub fn site_urls(&self) -> Vec<String> {
        let base = self.robots_url.trim_end_matches("/robots.txt");
        self.robots
            .rule_paths()
            .into_iter()
            .map(|path| format!("{}{}", base, path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_info_rules() {
        let robots = ParsedRobots::from_content(
            "User-agent: *\nDisallow: /private\nSitemap: https://a.com/sitemap.xml",
        );
        let info = DomainInfo::new("a.com", "https://a.com/robots.txt", robots);
        assert!(info.is_allowed("https://a.com/public"));
        assert!(!info.is_allowed("https://a.com/private/x"));
        assert_eq!(info.site_maps(), ["https://a.com/sitemap.xml"]);
        assert_eq!(info.site_urls(), vec!["https://a.com/private"]);
    }

    #[test]
    fn test_allow_all_info() {
        let info = DomainInfo::allow_all("a.com", "https://a.com/robots.txt");
        assert!(info.is_allowed("https://a.com/anything"));
        assert!(info.site_maps().is_empty());
    }
}
