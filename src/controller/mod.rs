use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use strum_macros::Display;
use tracing::{info, warn};

use crate::access::validate_region;
use crate::config::{Config, MetricsConfig, SolverConfig};
use crate::domain::{NewOptimization, OptimizationRecord, Region};
use crate::error::{EngineError, ValidationError};
use crate::optimizer::{derive_metrics, GradientDescent, Minimizer};
use crate::registry::RegionRegistry;
use crate::store::{HistoryStore, DEFAULT_HISTORY_LIMIT};

/// Shared application state handed to the transport layer.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub engine: Arc<GridEngine>,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        let store = build_store(&cfg).await?;
        let engine = Arc::new(GridEngine::new(
            RegionRegistry::builtin(),
            Box::new(GradientDescent),
            store,
            cfg.solver,
            cfg.metrics,
        ));
        Ok(Self { cfg, engine })
    }
}

async fn build_store(cfg: &Config) -> Result<Arc<dyn HistoryStore>> {
    #[cfg(feature = "db")]
    {
        return Ok(Arc::new(
            crate::store::SqliteHistoryStore::connect(&cfg.db.url).await?,
        ));
    }

    #[cfg(not(feature = "db"))]
    {
        let _ = cfg;
        Ok(Arc::new(crate::store::MemoryHistoryStore::new()))
    }
}

/// Result of one `optimize` call: the persisted record plus solver detail.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationOutcome {
    pub record: OptimizationRecord,
    pub iterations: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionStatus {
    pub region: Region,
    pub latest: Option<OptimizationRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GridHealth {
    Unoptimized,
    Healthy,
    NeedsOptimization,
}

/// Summary of recent optimization outcomes for one region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionAnalysis {
    pub region: Region,
    pub samples: usize,
    pub average_efficiency_percent: Option<f64>,
    pub best_efficiency_percent: Option<f64>,
    pub latest_losses_mw2: Option<f64>,
    pub total_cost_savings: f64,
    pub health: GridHealth,
}

/// The optimization-and-persistence engine.
///
/// Every operation runs the access gate first; a rejected region never
/// reaches the solver or the store. The closed operation set is `optimize`,
/// `status`, `analyze` and `history` - transports call these directly.
pub struct GridEngine {
    registry: RegionRegistry,
    minimizer: Box<dyn Minimizer>,
    store: Arc<dyn HistoryStore>,
    solver: SolverConfig,
    metrics: MetricsConfig,
}

impl GridEngine {
    pub fn new(
        registry: RegionRegistry,
        minimizer: Box<dyn Minimizer>,
        store: Arc<dyn HistoryStore>,
        solver: SolverConfig,
        metrics: MetricsConfig,
    ) -> Self {
        Self {
            registry,
            minimizer,
            store,
            solver,
            metrics,
        }
    }

    fn gated_region(&self, region_input: &str) -> Result<Region, EngineError> {
        let id = validate_region(region_input, &self.registry)?;
        self.registry
            .get(&id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownRegion(id.to_string()).into())
    }

    /// Balance supply against demand for the region and persist the outcome.
    pub async fn optimize(&self, region_input: &str) -> Result<OptimizationOutcome, EngineError> {
        let region = self.gated_region(region_input)?;
        let demand = region.base_demand_mw;

        let run = self.minimizer.minimize(
            &|supply| (supply - demand).powi(2),
            region.base_supply_mw,
            &self.solver,
        );
        if !run.converged {
            warn!(
                region = %region.id,
                iterations = run.iterations,
                best_supply_mw = run.best_x,
                "solver exhausted iteration budget"
            );
        }

        let derived = derive_metrics(run.best_x, demand, &self.metrics);
        let new = NewOptimization {
            region: region.id.clone(),
            optimized_supply_mw: run.best_x,
            optimized_demand_mw: demand,
            losses_mw2: derived.losses_mw2,
            efficiency_percent: derived.efficiency_percent,
            cost_savings: derived.cost_savings,
            loss_reduction_percent: derived.loss_reduction_percent,
            converged: run.converged,
            created_at: Utc::now(),
        };
        let id = self.store.append(&new).await?;

        info!(
            region = %new.region,
            id,
            optimized_supply_mw = new.optimized_supply_mw,
            losses_mw2 = new.losses_mw2,
            converged = new.converged,
            "optimization stored"
        );

        Ok(OptimizationOutcome {
            record: OptimizationRecord::from_new(id, new),
            iterations: run.iterations,
        })
    }

    /// Region info plus the most recent optimization, if any.
    pub async fn status(&self, region_input: &str) -> Result<RegionStatus, EngineError> {
        let region = self.gated_region(region_input)?;
        let latest = self.store.latest(&region.id).await?;
        Ok(RegionStatus { region, latest })
    }

    /// Most-recent-first history, bounded by `limit`.
    pub async fn history(
        &self,
        region_input: &str,
        limit: Option<usize>,
    ) -> Result<Vec<OptimizationRecord>, EngineError> {
        let region = self.gated_region(region_input)?;
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(self.store.history(&region.id, limit).await?)
    }

    /// Summarize recent outcomes against the configured efficiency target.
    pub async fn analyze(&self, region_input: &str) -> Result<RegionAnalysis, EngineError> {
        let region = self.gated_region(region_input)?;
        let records = self
            .store
            .history(&region.id, DEFAULT_HISTORY_LIMIT)
            .await?;

        let samples = records.len();
        let average_efficiency_percent = if samples > 0 {
            Some(records.iter().map(|r| r.efficiency_percent).sum::<f64>() / samples as f64)
        } else {
            None
        };
        let best_efficiency_percent = records
            .iter()
            .map(|r| r.efficiency_percent)
            .fold(None, |acc: Option<f64>, e| {
                Some(acc.map_or(e, |best| best.max(e)))
            });
        let latest_losses_mw2 = records.first().map(|r| r.losses_mw2);
        let total_cost_savings = records.iter().map(|r| r.cost_savings).sum();

        let health = match average_efficiency_percent {
            None => GridHealth::Unoptimized,
            Some(avg) if avg >= self.metrics.target_efficiency_percent => GridHealth::Healthy,
            Some(_) => GridHealth::NeedsOptimization,
        };

        Ok(RegionAnalysis {
            region,
            samples,
            average_efficiency_percent,
            best_efficiency_percent,
            latest_losses_mw2,
            total_cost_savings,
            health,
        })
    }

    /// The read-only region catalog.
    pub fn regions(&self) -> &[Region] {
        self.registry.all()
    }
}
