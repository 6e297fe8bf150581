use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::HistoryStore;
use crate::domain::{NewOptimization, OptimizationRecord, RecordId, RegionId};
use crate::error::StoreError;

/// In-memory history store, the default persistence medium.
///
/// The write lock serializes appends, which gives the per-region total
/// order the contract requires; ids are assigned in insertion order and
/// break timestamp ties.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: RecordId,
    records: Vec<OptimizationRecord>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total record count across all regions.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, new: &NewOptimization) -> Result<RecordId, StoreError> {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .records
            .push(OptimizationRecord::from_new(id, new.clone()));
        debug!(id, region = %new.region, "appended optimization record");
        Ok(id)
    }

    async fn latest(&self, region: &RegionId) -> Result<Option<OptimizationRecord>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .records
            .iter()
            .filter(|r| &r.region == region)
            .max_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn history(
        &self,
        region: &RegionId,
        limit: usize,
    ) -> Result<Vec<OptimizationRecord>, StoreError> {
        let inner = self.inner.read();
        let mut records: Vec<OptimizationRecord> = inner
            .records
            .iter()
            .filter(|r| &r.region == region)
            .cloned()
            .collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_record(region: &str, supply: f64) -> NewOptimization {
        NewOptimization {
            region: RegionId::new(region),
            optimized_supply_mw: supply,
            optimized_demand_mw: supply,
            losses_mw2: 0.0,
            efficiency_percent: 100.0,
            cost_savings: 25_000.0,
            loss_reduction_percent: 100.0,
            converged: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_then_latest_round_trip() {
        let store = MemoryHistoryStore::new();
        let region = RegionId::new("us-west");
        let id = store.append(&new_record("us-west", 1000.0)).await.unwrap();

        let latest = store.latest(&region).await.unwrap().unwrap();
        assert_eq!(latest.id, id);
        assert_eq!(latest.region, region);
        assert_eq!(latest.optimized_supply_mw, 1000.0);
        assert_eq!(latest.losses_mw2, 0.0);
    }

    #[tokio::test]
    async fn latest_is_none_for_never_optimized_region() {
        let store = MemoryHistoryStore::new();
        let region = RegionId::new("pgae");
        assert!(store.latest(&region).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_is_idempotent_between_appends() {
        let store = MemoryHistoryStore::new();
        let region = RegionId::new("us-east");
        store.append(&new_record("us-east", 1500.0)).await.unwrap();

        let first = store.latest(&region).await.unwrap().unwrap();
        let second = store.latest(&region).await.unwrap().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn history_is_most_recent_first_and_bounded() {
        let store = MemoryHistoryStore::new();
        let region = RegionId::new("us-west");
        for i in 0..15 {
            store
                .append(&new_record("us-west", 1000.0 + f64::from(i)))
                .await
                .unwrap();
        }

        let history = store.history(&region, 10).await.unwrap();
        assert_eq!(history.len(), 10);
        for pair in history.windows(2) {
            assert!((pair[0].created_at, pair[0].id) >= (pair[1].created_at, pair[1].id));
        }
        // Newest entry is the last appended supply value.
        assert_eq!(history[0].optimized_supply_mw, 1014.0);
    }

    #[tokio::test]
    async fn regions_do_not_interfere() {
        let store = MemoryHistoryStore::new();
        store.append(&new_record("us-west", 1000.0)).await.unwrap();
        store.append(&new_record("us-east", 1500.0)).await.unwrap();

        let west = store.history(&RegionId::new("us-west"), 10).await.unwrap();
        let east = store.history(&RegionId::new("us-east"), 10).await.unwrap();
        assert_eq!(west.len(), 1);
        assert_eq!(east.len(), 1);
        assert_eq!(west[0].optimized_supply_mw, 1000.0);
        assert_eq!(east[0].optimized_supply_mw, 1500.0);
    }
}
