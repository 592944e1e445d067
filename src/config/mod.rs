//! Configuration module for WebLens
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; [`Config::default`] carries the same values a
//! missing file would produce.
//!
//! # Example
//!
//! ```no_run
//! use weblens::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("weblens.toml")).unwrap();
//! println!("Requests time out after {}s", config.request.timeout_s);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CompoundConfig, Config, DomainCacheConfig, RemoteConfig, RequestConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
