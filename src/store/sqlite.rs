use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

use super::HistoryStore;
use crate::domain::{NewOptimization, OptimizationRecord, RecordId, RegionId};
use crate::error::StoreError;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS optimization_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    region TEXT NOT NULL,
    optimized_supply_mw REAL NOT NULL,
    optimized_demand_mw REAL NOT NULL,
    losses_mw2 REAL NOT NULL,
    efficiency_percent REAL NOT NULL,
    cost_savings REAL NOT NULL,
    loss_reduction_percent REAL NOT NULL,
    converged INTEGER NOT NULL,
    created_at TEXT NOT NULL
)
"#;

const CREATE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_optimization_history_region_created
    ON optimization_history (region, created_at)
"#;

/// SQLite-backed history store.
///
/// Single-row inserts per optimization; rowid autoincrement breaks
/// timestamp ties in insertion order.
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::from)?
            .create_if_missing(true);

        // An in-memory database exists per connection; the pool must not
        // fan out across several of them.
        let max_connections = if url.contains(":memory:") || url.contains("mode=memory") {
            1
        } else {
            5
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_INDEX).execute(&pool).await?;
        info!(url, "optimization history schema ready");

        Ok(Self { pool })
    }
}

fn record_from_row(row: &SqliteRow) -> Result<OptimizationRecord, sqlx::Error> {
    Ok(OptimizationRecord {
        id: row.try_get("id")?,
        region: RegionId::new(row.try_get::<String, _>("region")?),
        optimized_supply_mw: row.try_get("optimized_supply_mw")?,
        optimized_demand_mw: row.try_get("optimized_demand_mw")?,
        losses_mw2: row.try_get("losses_mw2")?,
        efficiency_percent: row.try_get("efficiency_percent")?,
        cost_savings: row.try_get("cost_savings")?,
        loss_reduction_percent: row.try_get("loss_reduction_percent")?,
        converged: row.try_get("converged")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, new: &NewOptimization) -> Result<RecordId, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO optimization_history (
                region, optimized_supply_mw, optimized_demand_mw, losses_mw2,
                efficiency_percent, cost_savings, loss_reduction_percent,
                converged, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(new.region.as_str())
        .bind(new.optimized_supply_mw)
        .bind(new.optimized_demand_mw)
        .bind(new.losses_mw2)
        .bind(new.efficiency_percent)
        .bind(new.cost_savings)
        .bind(new.loss_reduction_percent)
        .bind(new.converged)
        .bind(new.created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, region = %new.region, "appended optimization record");
        Ok(id)
    }

    async fn latest(&self, region: &RegionId) -> Result<Option<OptimizationRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, region, optimized_supply_mw, optimized_demand_mw, losses_mw2,
                   efficiency_percent, cost_savings, loss_reduction_percent,
                   converged, created_at
            FROM optimization_history
            WHERE region = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(region.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose().map_err(StoreError::from)
    }

    async fn history(
        &self,
        region: &RegionId,
        limit: usize,
    ) -> Result<Vec<OptimizationRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, region, optimized_supply_mw, optimized_demand_mw, losses_mw2,
                   efficiency_percent, cost_savings, loss_reduction_percent,
                   converged, created_at
            FROM optimization_history
            WHERE region = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(region.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }
}
