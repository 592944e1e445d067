//! Robots.txt parsing
//!
//! Allow/disallow matching is delegated to the robotstxt crate; `Sitemap:`
//! lines are collected separately since they belong to no user-agent group.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
#[derive(Debug, Clone, Default)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = allow all, false = parse content)
    allow_all: bool,
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
            sitemaps: parse_sitemaps(content),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// Used when robots.txt is missing, unreadable, or not respected.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
            sitemaps: Vec::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_allow_all(&self) -> bool {
        self.allow_all || self.content.trim().is_empty()
    }

    /// Checks if a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.is_allow_all() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// `Sitemap:` locations, in file order, without duplicates
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Literal `Allow` / `Disallow` paths; wildcard rules are skipped
    pub fn rule_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for line in self.content.lines() {
            let Some((key, value)) = line.trim().split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();
            if (key == "allow" || key == "disallow")
                && value.starts_with('/')
                && !value.contains('*')
                && !paths.iter().any(|p| p == value)
            {
                paths.push(value.to_string());
            }
        }
        paths
    }
}

fn parse_sitemaps(content: &str) -> Vec<String> {
    let mut sitemaps: Vec<String> = Vec::new();
    for line in content.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        if key.trim().eq_ignore_ascii_case("sitemap")
            && !value.is_empty()
            && !sitemaps.iter().any(|s| s == value)
        {
            sitemaps.push(value.to_string());
        }
    }
    sitemaps
}
