//! Snapshot caching
//!
//! `SnapshotCache` keeps the latest trades/politicians/issuers snapshot in
//! memory and refreshes it lazily once it outlives its TTL. It supports
//! graceful degradation: when a refresh fails, the stale snapshot (or seed
//! data) is served instead. `CacheManager` persists the snapshot records to
//! disk so a restart does not have to refetch.

mod manager;
mod snapshot;

pub use manager::{CacheManager, StoredRecord};
pub use snapshot::{
    is_stale, CacheError, RefreshSummary, SnapshotCache, DEFAULT_TTL_HOURS, ISSUERS_KEY,
    LAST_UPDATE_KEY, POLITICIANS_KEY, TRADES_KEY,
};
