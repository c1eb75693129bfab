//! Read-through snapshot cache
//!
//! `SnapshotCache` holds the latest snapshot and the time it was last
//! refreshed from its source. Reads refresh lazily once the snapshot is at or
//! past its TTL; a failed refresh keeps serving what is already held.
//! Refreshes are single-flight: concurrent stale readers wait for the one
//! in-flight refresh and reuse its result instead of fetching again.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::CacheManager;
use crate::data::{seed, Issuer, Politician, Snapshot, SnapshotSource, SourceError, Trade};

/// Default snapshot time-to-live (6 hours)
pub const DEFAULT_TTL_HOURS: i64 = 6;

/// Store key for the trades record
pub const TRADES_KEY: &str = "trades";
/// Store key for the politicians record
pub const POLITICIANS_KEY: &str = "politicians";
/// Store key for the issuers record
pub const ISSUERS_KEY: &str = "issuers";
/// Store key for the last successful refresh timestamp
pub const LAST_UPDATE_KEY: &str = "last_update";

/// Errors surfaced by the snapshot cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// No snapshot is held and the source could not provide one
    #[error("No snapshot available: {0}")]
    Unavailable(#[source] Arc<SourceError>),

    /// A forced refresh failed; the held snapshot is unchanged
    #[error("Refresh from {source_name} failed: {error}")]
    RefreshFailed {
        source_name: String,
        #[source]
        error: SourceError,
    },
}

/// Outcome of a successful refresh
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub source: String,
    pub trades: usize,
    pub politicians: usize,
    pub issuers: usize,
    pub refreshed_at: DateTime<Utc>,
}

impl RefreshSummary {
    /// Human-readable message for the refresh endpoint
    pub fn message(&self) -> String {
        format!(
            "Refreshed {} trades, {} politicians and {} issuers from {}",
            self.trades, self.politicians, self.issuers, self.source
        )
    }
}

/// Snapshot plus the time it was last refreshed from the source
#[derive(Debug, Default)]
struct CacheState {
    snapshot: Option<Arc<Snapshot>>,
    /// `None` when the snapshot came from seed fallback rather than a refresh
    refreshed_at: Option<DateTime<Utc>>,
    /// Bumped whenever a refresh attempt completes, successful or not
    attempts: u64,
    /// Error from the last attempt, cleared by a successful refresh
    last_error: Option<Arc<SourceError>>,
}

/// Returns true when a snapshot refreshed at `refreshed_at` must be refreshed at `now`
///
/// A snapshot that was never refreshed is always stale; otherwise it is stale
/// once its age reaches the TTL.
pub fn is_stale(refreshed_at: Option<DateTime<Utc>>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match refreshed_at {
        Some(at) => now - at >= ttl,
        None => true,
    }
}

/// Time-boxed cache over a `SnapshotSource`
pub struct SnapshotCache {
    source: Arc<dyn SnapshotSource>,
    store: Option<CacheManager>,
    ttl: Duration,
    seed_fallback: bool,
    state: RwLock<CacheState>,
    /// Held for the duration of a refresh
    refresh_lock: Mutex<()>,
}

impl SnapshotCache {
    /// Creates an empty cache over `source` with the default TTL and seed fallback enabled
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            source,
            store: None,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
            seed_fallback: true,
            state: RwLock::new(CacheState::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Sets the snapshot time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Persists refreshed snapshots to the given store
    pub fn with_store(mut self, store: CacheManager) -> Self {
        self.store = Some(store);
        self
    }

    /// Enables or disables installing seed data when no snapshot can be loaded
    pub fn with_seed_fallback(mut self, enabled: bool) -> Self {
        self.seed_fallback = enabled;
        self
    }

    /// Name of the underlying source
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Time of the last successful refresh, if any
    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.refreshed_at
    }

    /// Loads a previously persisted snapshot from the store
    ///
    /// All three records must be present. The persisted refresh timestamp is
    /// kept, so a snapshot that is still within its TTL is served without
    /// fetching. Returns true if a snapshot was loaded.
    pub async fn load_persisted(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        let trades = store.read::<Vec<Trade>>(TRADES_KEY);
        let politicians = store.read::<Vec<Politician>>(POLITICIANS_KEY);
        let issuers = store.read::<Vec<Issuer>>(ISSUERS_KEY);
        let (Some(trades), Some(politicians), Some(issuers)) = (trades, politicians, issuers) else {
            debug!(dir = %store.dir().display(), "No complete persisted snapshot");
            return false;
        };
        let refreshed_at = store
            .read::<DateTime<Utc>>(LAST_UPDATE_KEY)
            .map(|record| record.data);

        let snapshot = Snapshot {
            trades: trades.data,
            politicians: politicians.data,
            issuers: issuers.data,
        };
        info!(
            trades = snapshot.trades.len(),
            refreshed_at = ?refreshed_at,
            "Loaded persisted snapshot"
        );

        let mut state = self.state.write().await;
        state.snapshot = Some(Arc::new(snapshot));
        state.refreshed_at = refreshed_at;
        true
    }

    /// Returns the current snapshot, refreshing it first if it is stale
    ///
    /// A failed refresh is logged and the held snapshot is served instead.
    /// With nothing held, seed data is installed if seed fallback is enabled;
    /// otherwise `CacheError::Unavailable` is returned. Readers that waited on
    /// an in-flight refresh take its outcome, whether it succeeded or failed.
    pub async fn read(&self) -> Result<Arc<Snapshot>, CacheError> {
        let seen_attempts = self.state.read().await.attempts;
        if let Some(snapshot) = self.fresh_snapshot().await {
            debug!("Serving cached snapshot");
            return Ok(snapshot);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another reader may have refreshed while we waited for the lock
        if let Some(snapshot) = self.fresh_snapshot().await {
            return Ok(snapshot);
        }
        {
            let state = self.state.read().await;
            if state.attempts != seen_attempts {
                if let Some(snapshot) = state.snapshot.clone() {
                    debug!("Serving snapshot left by a concurrent refresh attempt");
                    return Ok(snapshot);
                }
                if let Some(error) = state.last_error.clone() {
                    return Err(CacheError::Unavailable(error));
                }
            }
        }

        match self.source.fetch().await {
            Ok(snapshot) => Ok(self.install(snapshot, Utc::now()).await.0),
            Err(error) => {
                let error = Arc::new(error);
                let mut state = self.state.write().await;
                state.attempts += 1;
                state.last_error = Some(Arc::clone(&error));

                if let Some(snapshot) = state.snapshot.clone() {
                    warn!(
                        source = self.source.name(),
                        %error,
                        "Refresh failed, serving stale snapshot"
                    );
                    return Ok(snapshot);
                }

                if self.seed_fallback {
                    warn!(
                        source = self.source.name(),
                        %error,
                        "Refresh failed with no snapshot held, installing seed data"
                    );
                    let snapshot = Arc::new(seed::seed_snapshot());
                    state.snapshot = Some(Arc::clone(&snapshot));
                    state.refreshed_at = None;
                    return Ok(snapshot);
                }

                Err(CacheError::Unavailable(error))
            }
        }
    }

    /// Refetches and replaces the snapshot regardless of its age
    ///
    /// On failure the held snapshot is left untouched and the error is returned.
    pub async fn force_refresh(&self) -> Result<RefreshSummary, CacheError> {
        let _guard = self.refresh_lock.lock().await;

        let snapshot = match self.source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                self.state.write().await.attempts += 1;
                return Err(CacheError::RefreshFailed {
                    source_name: self.source.name().to_string(),
                    error,
                });
            }
        };

        let (snapshot, refreshed_at) = self.install(snapshot, Utc::now()).await;
        Ok(RefreshSummary {
            source: self.source.name().to_string(),
            trades: snapshot.trades.len(),
            politicians: snapshot.politicians.len(),
            issuers: snapshot.issuers.len(),
            refreshed_at,
        })
    }

    /// Returns the held snapshot if it is within its TTL
    async fn fresh_snapshot(&self) -> Option<Arc<Snapshot>> {
        let state = self.state.read().await;
        if is_stale(state.refreshed_at, Utc::now(), self.ttl) {
            return None;
        }
        state.snapshot.clone()
    }

    /// Replaces the held snapshot and timestamp, then persists them
    async fn install(
        &self,
        snapshot: Snapshot,
        refreshed_at: DateTime<Utc>,
    ) -> (Arc<Snapshot>, DateTime<Utc>) {
        let snapshot = Arc::new(snapshot);
        {
            let mut state = self.state.write().await;
            state.snapshot = Some(Arc::clone(&snapshot));
            state.refreshed_at = Some(refreshed_at);
            state.attempts += 1;
            state.last_error = None;
        }

        info!(
            source = self.source.name(),
            trades = snapshot.trades.len(),
            politicians = snapshot.politicians.len(),
            issuers = snapshot.issuers.len(),
            "Snapshot refreshed"
        );

        self.persist(Arc::clone(&snapshot), refreshed_at).await;
        (snapshot, refreshed_at)
    }

    /// Writes the snapshot records to the store on the blocking pool
    ///
    /// Callers hold `refresh_lock`, so writes from two refreshes never interleave.
    async fn persist(&self, snapshot: Arc<Snapshot>, refreshed_at: DateTime<Utc>) {
        let Some(store) = self.store.clone() else {
            return;
        };

        let written =
            tokio::task::spawn_blocking(move || write_records(&store, &snapshot, refreshed_at))
                .await;
        if let Err(error) = written {
            warn!(%error, "Snapshot persistence task failed");
        }
    }
}

/// Writes every snapshot record; failures are logged only
fn write_records(store: &CacheManager, snapshot: &Snapshot, refreshed_at: DateTime<Utc>) {
    let results = [
        (TRADES_KEY, store.write(TRADES_KEY, &snapshot.trades)),
        (POLITICIANS_KEY, store.write(POLITICIANS_KEY, &snapshot.politicians)),
        (ISSUERS_KEY, store.write(ISSUERS_KEY, &snapshot.issuers)),
        (LAST_UPDATE_KEY, store.write(LAST_UPDATE_KEY, &refreshed_at)),
    ];
    for (key, result) in results {
        if let Err(error) = result {
            warn!(key, %error, "Failed to persist snapshot record");
        }
    }
}
