use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use validator::Validate;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::{AppState, OptimizationOutcome, RegionAnalysis, RegionStatus},
    domain::{OptimizationRecord, Region},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/optimize", post(optimize))
        .route("/status", get(status))
        .route("/analyze", get(analyze))
        .route("/history", get(history))
        .route("/regions", get(regions))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(Debug, Deserialize, Validate)]
pub struct OptimizeRequest {
    #[validate(length(min = 1, max = 128))]
    pub region: String,
}

/// Whether the solver met its tolerance within the iteration budget.
#[derive(Debug, Clone, Copy, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    NonConvergent,
}

/// Wire shape of one optimization outcome.
#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub status: SolveStatus,
    pub region: String,
    pub optimized_supply_mw: f64,
    pub optimized_demand_mw: f64,
    pub losses_mw2: f64,
    pub efficiency_percent: f64,
    pub cost_savings: f64,
    pub loss_reduction_percent: f64,
    pub iterations: u32,
    pub timestamp: DateTime<Utc>,
}

impl From<OptimizationOutcome> for OptimizeResponse {
    fn from(outcome: OptimizationOutcome) -> Self {
        let record = outcome.record;
        Self {
            status: if record.converged {
                SolveStatus::Optimal
            } else {
                SolveStatus::NonConvergent
            },
            region: record.region.to_string(),
            optimized_supply_mw: record.optimized_supply_mw,
            optimized_demand_mw: record.optimized_demand_mw,
            losses_mw2: record.losses_mw2,
            efficiency_percent: record.efficiency_percent,
            cost_savings: record.cost_savings,
            loss_reduction_percent: record.loss_reduction_percent,
            iterations: outcome.iterations,
            timestamp: record.created_at,
        }
    }
}

/// POST /api/v1/optimize - balance supply against demand for a region
pub async fn optimize(
    State(st): State<AppState>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<ApiResponse<OptimizeResponse>>, ApiError> {
    req.validate()?;
    let outcome = st.engine.optimize(&req.region).await?;
    Ok(Json(ApiResponse::success(OptimizeResponse::from(outcome))))
}

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    pub region: String,
}

/// GET /api/v1/status?region= - region info plus latest optimization
pub async fn status(
    State(st): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<ApiResponse<RegionStatus>>, ApiError> {
    let status = st.engine.status(&q.region).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// GET /api/v1/analyze?region= - recent-history summary for a region
pub async fn analyze(
    State(st): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<ApiResponse<RegionAnalysis>>, ApiError> {
    let analysis = st.engine.analyze(&q.region).await?;
    Ok(Json(ApiResponse::success(analysis)))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub region: String,
    pub limit: Option<usize>,
}

/// GET /api/v1/history?region=&limit= - most-recent-first outcomes
pub async fn history(
    State(st): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<OptimizationRecord>>>, ApiError> {
    let records = st.engine.history(&q.region, q.limit).await?;
    let count = records.len();
    Ok(Json(ApiResponse::success(records).with_count(count)))
}

/// GET /api/v1/regions - the read-only region catalog
pub async fn regions(
    State(st): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Region>>>, ApiError> {
    let regions = st.engine.regions().to_vec();
    let count = regions.len();
    Ok(Json(ApiResponse::success(regions).with_count(count)))
}
