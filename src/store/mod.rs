pub mod memory;
#[cfg(feature = "db")]
pub mod sqlite;

use async_trait::async_trait;

use crate::domain::{NewOptimization, OptimizationRecord, RecordId, RegionId};
use crate::error::StoreError;

pub use memory::MemoryHistoryStore;
#[cfg(feature = "db")]
pub use sqlite::SqliteHistoryStore;

/// Default bound on `history` queries.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Append-only, per-region history of optimization outcomes.
///
/// Records are immutable once appended. Appends for the same region are
/// totally ordered by timestamp, ties broken by insertion order; appends
/// for different regions do not interfere.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert a record, returning the id the store assigned to it.
    async fn append(&self, new: &NewOptimization) -> Result<RecordId, StoreError>;

    /// The record with the greatest timestamp for the region. `None` is the
    /// normal outcome for a region that was never optimized.
    async fn latest(&self, region: &RegionId) -> Result<Option<OptimizationRecord>, StoreError>;

    /// Most-recent-first history for the region, bounded by `limit`.
    async fn history(
        &self,
        region: &RegionId,
        limit: usize,
    ) -> Result<Vec<OptimizationRecord>, StoreError>;
}
