use crate::config::types::{
    CompoundConfig, Config, DomainCacheConfig, RemoteConfig, RequestConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_request_config(&config.request)?;
    validate_domain_cache_config(&config.domain_cache)?;
    validate_compound_config(&config.compound)?;
    validate_remote_config(&config.remote)?;
    Ok(())
}

/// Validates request defaults
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if config.timeout_s < 1 || config.timeout_s > 600 {
        return Err(ConfigError::Validation(format!(
            "timeout-s must be between 1 and 600, got {}",
            config.timeout_s
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.accept_types.trim().is_empty() {
        return Err(ConfigError::Validation(
            "accept-types cannot be empty, use \"all\" to accept everything".to_string(),
        ));
    }

    if config.bytes_limit == Some(0) {
        return Err(ConfigError::Validation(
            "bytes-limit must be greater than 0".to_string(),
        ));
    }

    if let Some(proxy) = &config.proxy {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    if config.crawler.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_domain_cache_config(config: &DomainCacheConfig) -> Result<(), ConfigError> {
    if config.capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "domain-cache capacity must be >= 1, got {}",
            config.capacity
        )));
    }
    Ok(())
}

fn validate_compound_config(config: &CompoundConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and 64, got {}",
            config.max_workers
        )));
    }
    Ok(())
}

fn validate_remote_config(config: &RemoteConfig) -> Result<(), ConfigError> {
    if let Some(server) = &config.server {
        let url = Url::parse(server).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid remote server '{}': {}", server, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Remote server '{}' must use HTTP or HTTPS",
                server
            )));
        }
    }

    if config.timeout_s < 1 {
        return Err(ConfigError::Validation(
            "remote timeout-s must be >= 1".to_string(),
        ));
    }

    Ok(())
}
