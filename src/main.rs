//! Trade Pulse - congressional stock-trade disclosures over a JSON API
//!
//! Parses the command line, builds the snapshot cache and serves the API
//! until interrupted.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use tradepulse::cli::{Cli, ServerConfig};
use tradepulse::logging::init_logging;
use tradepulse::server::{self, AppState};

/// Waits for Ctrl+C so the server can drain in-flight requests
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match ServerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    init_logging();

    let cache = server::build_cache(&config)?;
    cache.load_persisted().await;
    let state = AppState::new(Arc::new(cache), config.stats);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        source = state.cache.source_name(),
        ttl_hours = config.ttl.num_hours(),
        "Serving Trade Pulse API"
    );

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
