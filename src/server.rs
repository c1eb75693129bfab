//! JSON API over the snapshot cache
//!
//! Every response uses the `{success, data?, error?}` envelope. Handler
//! failures are logged and answered with HTTP 500 and a fixed error string
//! per endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::cache::{CacheError, CacheManager, SnapshotCache};
use crate::cli::ServerConfig;
use crate::data::{FeedClient, FeedError, SeedSource, Snapshot, SnapshotSource};
use crate::query::TradeFilter;
use crate::stats::{compute_dashboard_stats, politician_leaderboard, StatsOptions};

/// Name reported by the health endpoint
pub const API_NAME: &str = "Congress Trade Pulse API";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SnapshotCache>,
    pub stats: StatsOptions,
}

impl AppState {
    pub fn new(cache: Arc<SnapshotCache>, stats: StatsOptions) -> Self {
        Self { cache, stats }
    }
}

/// API response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        let body = Self {
            success: true,
            data: Some(data),
            error: None,
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Logs `err` and answers with a 500 carrying the endpoint's fixed message
fn failure(message: &'static str, err: &CacheError) -> Response {
    error!(error = %err, "{}", message);
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message.to_string()),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Message returned by the refresh endpoint
#[derive(Debug, Serialize)]
struct RefreshMessage {
    message: String,
}

/// Health endpoint payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthInfo {
    name: &'static str,
    source: String,
    last_refresh: Option<DateTime<Utc>>,
}

/// Builds the snapshot cache described by `config`
///
/// Uses the feed client when a feed URL is configured and the seed source
/// otherwise. Persistence goes to the configured directory, or to the XDG
/// cache directory when none was given and persistence is enabled.
pub fn build_cache(config: &ServerConfig) -> Result<SnapshotCache, FeedError> {
    let source: Arc<dyn SnapshotSource> = match &config.feed_url {
        Some(url) => Arc::new(FeedClient::with_timeout(url.as_str(), config.fetch_timeout)?),
        None => Arc::new(SeedSource),
    };

    let store = match &config.cache_dir {
        Some(dir) => Some(CacheManager::with_dir(dir.clone())),
        None if config.use_default_cache_dir => CacheManager::new(),
        None => None,
    };

    let mut cache = SnapshotCache::new(source)
        .with_ttl(config.ttl)
        .with_seed_fallback(config.seed_fallback);
    if let Some(store) = store {
        info!(dir = %store.dir().display(), "Persisting snapshots");
        cache = cache.with_store(store);
    }
    Ok(cache)
}

/// Builds the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/trades", get(get_trades))
        .route("/api/stats", get(get_stats))
        .route("/api/politicians", get(get_politicians))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/refresh", post(refresh))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Reads the snapshot and maps it through `f`, or fails with `message`
async fn with_snapshot<T: Serialize>(
    state: &AppState,
    message: &'static str,
    f: impl FnOnce(&Snapshot) -> T,
) -> Response {
    match state.cache.read().await {
        Ok(snapshot) => ApiResponse::ok(f(snapshot.as_ref())),
        Err(err) => failure(message, &err),
    }
}

/// GET /api/health
async fn health(State(state): State<AppState>) -> Response {
    ApiResponse::ok(HealthInfo {
        name: API_NAME,
        source: state.cache.source_name().to_string(),
        last_refresh: state.cache.last_refreshed().await,
    })
}

/// GET /api/trades - all trades, optionally filtered by `q`, `type` and `chamber`
async fn get_trades(State(state): State<AppState>, Query(filter): Query<TradeFilter>) -> Response {
    with_snapshot(&state, "Failed to fetch trades", |s| filter.apply(s)).await
}

/// GET /api/stats
async fn get_stats(State(state): State<AppState>) -> Response {
    let options = state.stats;
    with_snapshot(&state, "Failed to fetch stats", |s| {
        compute_dashboard_stats(s, &options)
    })
    .await
}

/// GET /api/politicians
async fn get_politicians(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "Failed to fetch politicians", |s| s.politicians.clone()).await
}

/// GET /api/leaderboard
async fn get_leaderboard(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "Failed to fetch leaderboard", politician_leaderboard).await
}

/// POST /api/refresh - forces a refresh regardless of snapshot age
async fn refresh(State(state): State<AppState>) -> Response {
    match state.cache.force_refresh().await {
        Ok(summary) => ApiResponse::ok(RefreshMessage {
            message: summary.message(),
        }),
        Err(err) => failure("Failed to refresh data", &err),
    }
}
