use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized, registry-checked region identifier.
///
/// Values are only produced by the access validator (or the built-in
/// registry seeds), so holding a `RegionId` is proof the region passed the
/// access gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub(crate) fn new(normalized: impl Into<String>) -> Self {
        Self(normalized.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RegionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Immutable reference data for one grid region.
///
/// Created at registry initialization and never mutated at runtime; the base
/// load figures are the starting point for every optimization of the region.
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub id: RegionId,
    pub display_name: String,
    pub base_demand_mw: f64,
    pub base_supply_mw: f64,
}

/// Record id assigned by the history store on append.
pub type RecordId = i64;

/// Insert form of an optimization outcome, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewOptimization {
    pub region: RegionId,
    pub optimized_supply_mw: f64,
    pub optimized_demand_mw: f64,
    pub losses_mw2: f64,
    pub efficiency_percent: f64,
    pub cost_savings: f64,
    pub loss_reduction_percent: f64,
    pub converged: bool,
    pub created_at: DateTime<Utc>,
}

/// A persisted optimization outcome. Append-only; never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub id: RecordId,
    pub region: RegionId,
    pub optimized_supply_mw: f64,
    pub optimized_demand_mw: f64,
    pub losses_mw2: f64,
    pub efficiency_percent: f64,
    pub cost_savings: f64,
    pub loss_reduction_percent: f64,
    pub converged: bool,
    pub created_at: DateTime<Utc>,
}

impl OptimizationRecord {
    pub fn from_new(id: RecordId, new: NewOptimization) -> Self {
        Self {
            id,
            region: new.region,
            optimized_supply_mw: new.optimized_supply_mw,
            optimized_demand_mw: new.optimized_demand_mw,
            losses_mw2: new.losses_mw2,
            efficiency_percent: new.efficiency_percent,
            cost_savings: new.cost_savings,
            loss_reduction_percent: new.loss_reduction_percent,
            converged: new.converged,
            created_at: new.created_at,
        }
    }
}
