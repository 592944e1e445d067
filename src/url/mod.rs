//! URL handling module for WebLens
//!
//! This module provides the one-time canonicalization applied before handler
//! matching, domain extraction for the robots cache, and the path-prefix rules
//! that site-specific handlers match against.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{domain_key, extract_domain, robots_url};
pub use matcher::{first_matching_rule, matches_wildcard, PathRule};
pub use normalize::{canonicalize_url, strip_protocol};
