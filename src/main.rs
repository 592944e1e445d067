//! WebLens main entry point
//!
//! Resolves one URL and prints its properties document as JSON.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use weblens::config::{load_config_with_hash, Config};
use weblens::handler::all_properties;
use weblens::{FetchOutcome, Resolver, ResolverContext};

/// WebLens: typed content resolution for arbitrary URLs
///
/// Fetches the URL with the handler that fits it best (YouTube, Odysee, plain
/// HTTP), honours robots.txt and prints title, feeds, hashes and the raw
/// response metadata.
#[derive(Parser, Debug)]
#[command(name = "weblens")]
#[command(version)]
#[command(about = "Resolve a URL into a typed content model", long_about = None)]
struct Cli {
    /// URL to resolve
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Do not consult robots.txt
    #[arg(long)]
    no_robots: bool,

    /// Include feed entries in the output
    #[arg(long)]
    entries: bool,

    /// Total deadline of each request, in seconds
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..=600))]
    timeout: Option<u64>,

    /// Use this handler instead of matching one
    #[arg(long, value_name = "NAME")]
    handler: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if cli.no_robots {
        config.request.respect_robots = false;
    }
    if let Some(timeout) = cli.timeout {
        config.request.timeout_s = timeout;
    }

    let context = ResolverContext::from_config(&config);
    let mut request = context.request_for_url(cli.url.clone());
    if let Some(name) = &cli.handler {
        request = request.with_handler(name.clone());
    }

    let mut resolver = Resolver::with_request(context, request)
        .with_context(|| format!("Cannot resolve {}", cli.url))?;

    let document = match resolver.get_response().await? {
        FetchOutcome::Blocked => serde_json::json!({ "blocked": true }),
        FetchOutcome::Fetched(_) | FetchOutcome::NoData => {
            let handler = resolver
                .handler()
                .context("No handler was selected")?;
            all_properties(handler, cli.entries)
        }
    };

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the JSON on stdout stays parseable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("weblens=info,warn"),
            1 => EnvFilter::new("weblens=debug,info"),
            2 => EnvFilter::new("weblens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_range() {
        for bad in ["0", "601", "-1"] {
            let result = Cli::try_parse_from(["weblens", "--timeout", bad, "https://a.com"]);
            assert!(result.is_err(), "{}", bad);
        }

        let cli = Cli::try_parse_from(["weblens", "--timeout", "600", "https://a.com"]).unwrap();
        assert_eq!(cli.timeout, Some(600));

        let cli = Cli::try_parse_from(["weblens", "https://a.com"]).unwrap();
        assert_eq!(cli.timeout, None);
    }
}
