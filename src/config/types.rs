use serde::Deserialize;
use std::collections::BTreeMap;

/// Default user agent sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Name of the crawler bound when nothing else is configured
pub const DEFAULT_CRAWLER: &str = "HttpCrawler";

/// Main configuration structure for WebLens
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(rename = "domain-cache", default)]
    pub domain_cache: DomainCacheConfig,
    #[serde(default)]
    pub compound: CompoundConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Defaults applied to every request a resolver issues
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Hard deadline for a whole transfer (seconds)
    #[serde(rename = "timeout-s")]
    pub timeout_s: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Consult robots.txt before returning data
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,

    #[serde(rename = "ssl-verify")]
    pub ssl_verify: bool,

    /// `"all"` or a list of content-type keys such as `"html"`, `"rss"`
    #[serde(rename = "accept-types")]
    pub accept_types: String,

    /// Responses larger than this many bytes are rejected
    #[serde(rename = "bytes-limit")]
    pub bytes_limit: Option<u64>,

    pub proxy: Option<String>,

    /// Crawler backend bound to each resolver
    pub crawler: String,

    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_s: 20,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            respect_robots: true,
            ssl_verify: true,
            accept_types: "all".to_string(),
            bytes_limit: None,
            proxy: None,
            crawler: DEFAULT_CRAWLER.to_string(),
            headers: BTreeMap::new(),
        }
    }
}

/// Robots.txt cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DomainCacheConfig {
    /// Maximum number of domains kept in memory
    pub capacity: usize,
}

impl Default for DomainCacheConfig {
    fn default() -> Self {
        Self { capacity: 400 }
    }
}

/// Compound handler configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompoundConfig {
    /// Number of sources fetched at once
    #[serde(rename = "max-workers")]
    pub max_workers: usize,
}

impl Default for CompoundConfig {
    fn default() -> Self {
        Self { max_workers: 4 }
    }
}

/// Remote crawler server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the remote crawling server, e.g. `http://127.0.0.1:3000`
    pub server: Option<String>,

    #[serde(rename = "timeout-s")]
    pub timeout_s: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            server: None,
            timeout_s: 30,
        }
    }
}
