//! Integration tests for CLI argument handling
//!
//! Runs the binary for flags that exit before the server starts, and checks
//! config validation through the library API.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tradepulse"))
        .args(args)
        .env_remove("TRADEPULSE_BIND")
        .env_remove("TRADEPULSE_FEED_URL")
        .env_remove("TRADEPULSE_TTL_HOURS")
        .env_remove("TRADEPULSE_CACHE_DIR")
        .env_remove("TRADEPULSE_FETCH_TIMEOUT")
        .output()
        .expect("Failed to execute tradepulse")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tradepulse"), "Help should mention tradepulse");
    assert!(stdout.contains("--feed-url"), "Help should mention --feed-url");
    assert!(stdout.contains("--ttl-hours"), "Help should mention --ttl-hours");
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_feed_url_prints_error_and_exits() {
    let output = run_cli(&["--feed-url", "ftp://example.com/feed"]);
    assert!(
        !output.status.success(),
        "Expected invalid feed URL to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid feed URL"),
        "Should print error message about the feed URL: {}",
        stderr
    );
}

#[test]
fn test_invalid_bind_prints_error_and_exits() {
    let output = run_cli(&["--bind", "nowhere"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid bind address"), "{}", stderr);
}

#[test]
fn test_non_numeric_ttl_is_rejected_by_parser() {
    let output = run_cli(&["--ttl-hours", "soon"]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use tradepulse::cli::{Cli, CliError, ServerConfig};

    #[test]
    fn test_cli_no_args_uses_seed_source() {
        let cli = Cli::parse_from(["tradepulse"]);
        assert!(cli.feed_url.is_none());
    }

    #[test]
    fn test_cli_feed_url_is_kept() {
        let cli = Cli::parse_from(["tradepulse", "--feed-url", "http://localhost:9000"]);
        let config = ServerConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.feed_url.map(|u| u.to_string()),
            Some("http://localhost:9000/".to_string())
        );
    }

    #[test]
    fn test_cli_flags_toggle_persistence_and_fallback() {
        let cli = Cli::parse_from(["tradepulse", "--no-persist", "--no-seed-fallback"]);
        let config = ServerConfig::from_cli(&cli).unwrap();
        assert!(config.cache_dir.is_none());
        assert!(!config.use_default_cache_dir);
        assert!(!config.seed_fallback);
    }

    #[test]
    fn test_cli_zero_trend_window_is_rejected() {
        let cli = Cli::parse_from(["tradepulse", "--trend-days", "0"]);
        let result = ServerConfig::from_cli(&cli);
        assert!(matches!(result, Err(CliError::ZeroValue("trend-days"))));
    }
}
