//! Command-line interface parsing for Trade Pulse
//!
//! This module handles parsing of CLI arguments using clap and validating them
//! into a `ServerConfig`. Every flag can also be set from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use thiserror::Error;

use crate::cache::DEFAULT_TTL_HOURS;
use crate::stats::{StatsOptions, DEFAULT_RECENT_LIMIT, DEFAULT_TREND_WINDOW};

/// Upper bound for `--ttl-hours` (ten years)
const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The bind address is not a valid socket address
    #[error("Invalid bind address: '{0}'. Expected host:port, e.g. 127.0.0.1:8787")]
    InvalidBind(String),

    /// The feed URL is not an absolute http(s) URL
    #[error("Invalid feed URL: '{0}'. Expected an absolute http:// or https:// URL")]
    InvalidFeedUrl(String),

    /// A numeric option that must be positive was zero
    #[error("Invalid value for --{0}: must be greater than zero")]
    ZeroValue(&'static str),
}

/// Trade Pulse - congressional trade disclosures over a JSON API
#[derive(Parser, Debug)]
#[command(name = "tradepulse")]
#[command(about = "Serve congressional stock-trade disclosures from a TTL snapshot cache")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "TRADEPULSE_BIND", default_value = "127.0.0.1:8787")]
    pub bind: String,

    /// Base URL of the disclosure feed (serves politicians.json, issuers.json, trades.json)
    ///
    /// Without a feed URL, generated seed data is served.
    #[arg(long, env = "TRADEPULSE_FEED_URL", value_name = "URL")]
    pub feed_url: Option<String>,

    /// Hours before a snapshot is considered stale
    #[arg(long, env = "TRADEPULSE_TTL_HOURS", default_value_t = DEFAULT_TTL_HOURS as u64)]
    pub ttl_hours: u64,

    /// Directory for the persisted snapshot (defaults to the XDG cache directory)
    #[arg(long, env = "TRADEPULSE_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Do not persist snapshots to disk
    #[arg(long)]
    pub no_persist: bool,

    /// Fail requests instead of serving seed data when nothing can be loaded
    #[arg(long)]
    pub no_seed_fallback: bool,

    /// Timeout for each feed request, in seconds
    #[arg(long, env = "TRADEPULSE_FETCH_TIMEOUT", default_value_t = 15)]
    pub fetch_timeout_secs: u64,

    /// Number of publication dates in the dashboard trend series
    #[arg(long, default_value_t = DEFAULT_TREND_WINDOW)]
    pub trend_days: usize,

    /// Number of recent trades shown on the dashboard
    #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
    pub recent_trades: usize,
}

/// Validated server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Feed base URL; `None` serves seed data
    pub feed_url: Option<Url>,
    pub ttl: chrono::Duration,
    /// Where to persist snapshots; `None` disables persistence
    pub cache_dir: Option<PathBuf>,
    /// Use the XDG cache directory when no explicit directory is given
    pub use_default_cache_dir: bool,
    pub seed_fallback: bool,
    pub fetch_timeout: Duration,
    pub stats: StatsOptions,
}

/// Parses a feed URL, accepting only absolute http(s) URLs
pub fn parse_feed_url(s: &str) -> Result<Url, CliError> {
    let url = Url::parse(s).map_err(|_| CliError::InvalidFeedUrl(s.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(CliError::InvalidFeedUrl(s.to_string())),
    }
}

impl ServerConfig {
    /// Creates a ServerConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(ServerConfig)` with validated settings
    /// * `Err(CliError)` if any argument is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let bind = cli
            .bind
            .parse::<SocketAddr>()
            .map_err(|_| CliError::InvalidBind(cli.bind.clone()))?;

        let feed_url = cli.feed_url.as_deref().map(parse_feed_url).transpose()?;

        if cli.fetch_timeout_secs == 0 {
            return Err(CliError::ZeroValue("fetch-timeout-secs"));
        }
        if cli.trend_days == 0 {
            return Err(CliError::ZeroValue("trend-days"));
        }
        if cli.recent_trades == 0 {
            return Err(CliError::ZeroValue("recent-trades"));
        }

        let (cache_dir, use_default_cache_dir) = if cli.no_persist {
            (None, false)
        } else {
            (cli.cache_dir.clone(), cli.cache_dir.is_none())
        };

        Ok(ServerConfig {
            bind,
            feed_url,
            ttl: chrono::Duration::hours(cli.ttl_hours.min(MAX_TTL_HOURS) as i64),
            cache_dir,
            use_default_cache_dir,
            seed_fallback: !cli.no_seed_fallback,
            fetch_timeout: Duration::from_secs(cli.fetch_timeout_secs),
            stats: StatsOptions {
                trend_window: cli.trend_days,
                recent_limit: cli.recent_trades,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["tradepulse"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_parse_feed_url_accepts_http_and_https() {
        assert!(parse_feed_url("http://localhost:9000/feed").is_ok());
        assert!(parse_feed_url("https://example.com/disclosures/").is_ok());
    }

    #[test]
    fn test_parse_feed_url_rejects_other_schemes() {
        let err = parse_feed_url("ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("Invalid feed URL"));
        assert!(parse_feed_url("not a url").is_err());
        assert!(parse_feed_url("file:///tmp/feed").is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::from_cli(&parse(&[])).unwrap();

        assert_eq!(config.bind, "127.0.0.1:8787".parse::<SocketAddr>().unwrap());
        assert!(config.feed_url.is_none());
        assert_eq!(config.ttl, chrono::Duration::hours(6));
        assert!(config.cache_dir.is_none());
        assert!(config.use_default_cache_dir);
        assert!(config.seed_fallback);
        assert_eq!(config.fetch_timeout, Duration::from_secs(15));
        assert_eq!(config.stats, StatsOptions::default());
    }

    #[test]
    fn test_config_custom_values() {
        let cli = parse(&[
            "--bind",
            "0.0.0.0:9000",
            "--feed-url",
            "https://feed.example.com/v1",
            "--ttl-hours",
            "1",
            "--cache-dir",
            "/tmp/tp",
            "--no-seed-fallback",
            "--fetch-timeout-secs",
            "3",
            "--trend-days",
            "7",
            "--recent-trades",
            "8",
        ]);
        let config = ServerConfig::from_cli(&cli).unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(
            config.feed_url.as_ref().map(|u| u.as_str()),
            Some("https://feed.example.com/v1")
        );
        assert_eq!(config.ttl, chrono::Duration::hours(1));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/tp")));
        assert!(!config.use_default_cache_dir);
        assert!(!config.seed_fallback);
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.stats.trend_window, 7);
        assert_eq!(config.stats.recent_limit, 8);
    }

    #[test]
    fn test_no_persist_disables_cache_dir() {
        let config = ServerConfig::from_cli(&parse(&["--no-persist", "--cache-dir", "/tmp/x"])).unwrap();
        assert!(config.cache_dir.is_none());
        assert!(!config.use_default_cache_dir);
    }

    #[test]
    fn test_invalid_bind_is_rejected() {
        let err = ServerConfig::from_cli(&parse(&["--bind", "localhost"])).unwrap_err();
        assert!(matches!(err, CliError::InvalidBind(_)));
        assert!(err.to_string().contains("localhost"));
    }

    #[test]
    fn test_invalid_feed_url_is_rejected() {
        let err = ServerConfig::from_cli(&parse(&["--feed-url", "feed.example.com"])).unwrap_err();
        assert!(matches!(err, CliError::InvalidFeedUrl(_)));
    }

    #[test]
    fn test_zero_values_are_rejected() {
        let err = ServerConfig::from_cli(&parse(&["--trend-days", "0"])).unwrap_err();
        assert!(err.to_string().contains("--trend-days"));

        let err = ServerConfig::from_cli(&parse(&["--recent-trades", "0"])).unwrap_err();
        assert!(err.to_string().contains("--recent-trades"));

        let err = ServerConfig::from_cli(&parse(&["--fetch-timeout-secs", "0"])).unwrap_err();
        assert!(err.to_string().contains("--fetch-timeout-secs"));
    }

    #[test]
    fn test_huge_ttl_is_capped() {
        let config = ServerConfig::from_cli(&parse(&["--ttl-hours", "18446744073709551615"])).unwrap();
        assert_eq!(config.ttl, chrono::Duration::hours(MAX_TTL_HOURS as i64));
    }

    #[test]
    fn test_zero_ttl_is_allowed() {
        let config = ServerConfig::from_cli(&parse(&["--ttl-hours", "0"])).unwrap();
        assert_eq!(config.ttl, chrono::Duration::zero());
    }
}
