//! Snapshot sources
//!
//! A `SnapshotSource` produces a complete snapshot on demand. The cache calls
//! it whenever the held snapshot is stale or a refresh is forced.

use async_trait::async_trait;
use thiserror::Error;

use super::feed::{FeedClient, FeedError};
use super::{seed, Snapshot};

/// Errors a snapshot source can report
#[derive(Debug, Error)]
pub enum SourceError {
    /// The external feed could not be fetched or parsed
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The source answered but had no usable trades
    #[error("Source {0} returned no usable trades")]
    Empty(String),
}

/// Something that can produce a full snapshot
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Short human-readable name used in logs and refresh messages
    fn name(&self) -> &str;

    /// Produces a complete snapshot
    async fn fetch(&self) -> Result<Snapshot, SourceError>;
}

/// Generates mock data from the static seed roster
#[derive(Debug, Clone, Default)]
pub struct SeedSource;

#[async_trait]
impl SnapshotSource for SeedSource {
    fn name(&self) -> &str {
        "seed"
    }

    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        Ok(seed::seed_snapshot())
    }
}

#[async_trait]
impl SnapshotSource for FeedClient {
    fn name(&self) -> &str {
        self.base_url()
    }

    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let snapshot = self.fetch_snapshot().await?;
        if snapshot.trades.is_empty() {
            return Err(SourceError::Empty(self.base_url().to_string()));
        }
        Ok(snapshot)
    }
}
