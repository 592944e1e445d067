//! WebLens: typed content resolution for arbitrary URLs
//!
//! This crate turns a URL into a normalized content model (HTML page, RSS/Atom
//! feed, JSON document, OPML outline). Site quirks live behind pluggable
//! handlers, every network call carries a hard deadline, robots.txt is honoured
//! through a bounded per-domain cache, and content/body hashes are produced
//! for change detection.

pub mod config;
pub mod crawler;
pub mod handler;
pub mod page;
pub mod remote;
pub mod request;
pub mod resolver;
pub mod response;
pub mod robots;
pub mod status;
pub mod url;

use thiserror::Error;

/// Main error type for WebLens operations
///
/// Transport failures are never reported through this type; they are encoded
/// in the status code and error list of a [`ResponseModel`].
#[derive(Debug, Error)]
pub enum WebLensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Unknown handler: {0}")]
    UnknownHandler(String),

    #[error("Unknown crawler: {0}")]
    UnknownCrawler(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Empty URL")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for WebLens operations
pub type Result<T> = std::result::Result<T, WebLensError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use handler::Handler;
pub use page::{FeedEntry, Page, PageFactory};
pub use request::RequestSpec;
pub use resolver::{FetchOutcome, Resolver, ResolverContext};
pub use response::ResponseModel;
pub use robots::{DomainCache, DomainInfo};
pub use status::StatusClass;
