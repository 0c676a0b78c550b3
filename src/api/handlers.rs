//! API handlers: stateless scenario projections, scenario sessions, insights.
//!
//! All handlers return `Response` via [`ApiResponse`] or [`ApiErrorResponse`].

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::envelope::{ApiErrorResponse, ApiResponse, ErrorCode};
use crate::config::{DriverRange, PlantConfig};
use crate::error::EngineError;
use crate::insights::{self, PRESET_QUESTIONS};
use crate::projection_engine::{
    build_waterfall, project_clinker_factor_impact, project_financials, project_packaging_impact,
    project_power_arbitrage, project_raw_material_savings,
};
use crate::session::{Driver, DriverUpdate, RangePolicy, ScenarioSession};
use crate::types::{MixComposition, ScenarioReport};

// ============================================================================
// State
// ============================================================================

/// Shared state for all handlers.
#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<PlantConfig>,
    pub sessions: Arc<RwLock<HashMap<Uuid, ScenarioSession>>>,
    pub started_at: DateTime<Utc>,
}

impl DashboardState {
    pub fn new(config: Arc<PlantConfig>) -> Self {
        Self {
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            started_at: Utc::now(),
        }
    }
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub plant: String,
    pub period: String,
    pub uptime_secs: i64,
    pub active_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct DriverSpec {
    pub name: String,
    #[serde(flatten)]
    pub range: DriverRange,
    pub baseline: f64,
}

#[derive(Debug, Serialize)]
pub struct DriversResponse {
    pub drivers: Vec<DriverSpec>,
    pub mix_shares: Vec<DriverSpec>,
    pub bag_specs_gsm: Vec<u32>,
    pub baseline_bag_spec_gsm: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinancialsRequest {
    #[serde(default)]
    pub fuel_price_delta_pct: f64,
    #[serde(default)]
    pub volume_delta_pct: f64,
    #[serde(default)]
    pub price_delta_pct: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawMixRequest {
    pub shares: MixComposition,
}

#[derive(Debug, Deserialize)]
pub struct ClinkerRequest {
    pub target_clinker_pct: f64,
}

#[derive(Debug, Deserialize)]
pub struct PackagingRequest {
    pub spec_gsm: u32,
}

#[derive(Debug, Deserialize)]
pub struct PowerRequest {
    pub gas_utilization_pct: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub policy: RangePolicy,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session: ScenarioSession,
    pub report: ScenarioReport,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct PresetQuestion {
    pub question: &'static str,
    pub topic: insights::Topic,
}

// ============================================================================
// Internal helpers
// ============================================================================

fn session_view(session: &ScenarioSession, config: &PlantConfig) -> Response {
    match session.project(config) {
        Ok(report) => ApiResponse::ok(SessionView {
            session: session.clone(),
            report,
        }),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

fn session_not_found(id: Uuid) -> Response {
    ApiErrorResponse::not_found(format!("No scenario session {id}"))
}

/// A submitted mix must give a share for every configured component, each
/// inside its range, and nothing else.
fn check_mix(config: &PlantConfig, shares: &MixComposition) -> Result<(), EngineError> {
    if let Some(missing) = config
        .drivers
        .mix_shares
        .keys()
        .find(|component| !shares.contains(component))
    {
        return Err(EngineError::MissingComponent(missing.clone()));
    }
    for (component, value) in shares.iter() {
        let range = config
            .drivers
            .mix_shares
            .get(component)
            .ok_or_else(|| EngineError::UnknownComponent(component.to_string()))?;
        range.check(&format!("mix_shares.{component}"), value)?;
    }
    Ok(())
}

// ============================================================================
// System / baseline
// ============================================================================

pub async fn system_health(State(state): State<DashboardState>) -> Response {
    let active_sessions = state.sessions.read().await.len();
    ApiResponse::ok(HealthResponse {
        status: "ok",
        plant: state.config.plant.name.clone(),
        period: state.config.plant.period.clone(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        active_sessions,
    })
}

pub async fn get_baseline(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(state.config.as_ref())
}

pub async fn get_drivers(State(state): State<DashboardState>) -> Response {
    let config = state.config.as_ref();
    let baseline_mix = config.raw_material.baseline_mix();
    let baseline = crate::session::DriverValues::baseline(config);

    ApiResponse::ok(DriversResponse {
        drivers: Driver::ALL
            .iter()
            .map(|&d| DriverSpec {
                name: d.name().to_string(),
                range: d.range(config),
                baseline: baseline.get(d),
            })
            .collect(),
        mix_shares: config
            .drivers
            .mix_shares
            .iter()
            .map(|(name, range)| DriverSpec {
                name: name.clone(),
                range: *range,
                baseline: baseline_mix.get(name).unwrap_or(0.0),
            })
            .collect(),
        bag_specs_gsm: config.packaging.allowed_specs(),
        baseline_bag_spec_gsm: config.packaging.baseline_spec_gsm,
    })
}

pub async fn margin_waterfall(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(build_waterfall(&state.config.pnl))
}

// ============================================================================
// Stateless projections
// ============================================================================

pub async fn scenario_financials(
    State(state): State<DashboardState>,
    Json(req): Json<FinancialsRequest>,
) -> Response {
    let d = &state.config.drivers;
    let checked = d
        .fuel_price
        .check(Driver::FuelPrice.name(), req.fuel_price_delta_pct)
        .and_then(|_| d.production_volume.check(Driver::ProductionVolume.name(), req.volume_delta_pct))
        .and_then(|_| d.cement_price.check(Driver::CementPrice.name(), req.price_delta_pct));
    if let Err(e) = checked {
        return ApiErrorResponse::from_engine(&e);
    }

    ApiResponse::ok(project_financials(
        &state.config.financials,
        req.fuel_price_delta_pct,
        req.volume_delta_pct,
        req.price_delta_pct,
    ))
}

pub async fn scenario_raw_mix(
    State(state): State<DashboardState>,
    Json(req): Json<RawMixRequest>,
) -> Response {
    let config = state.config.as_ref();
    if let Err(e) = check_mix(config, &req.shares) {
        return ApiErrorResponse::from_engine(&e);
    }

    let rm = &config.raw_material;
    match project_raw_material_savings(
        rm.total_tonnage,
        &rm.unit_costs,
        &rm.baseline_mix(),
        &req.shares,
        rm.baseline_pricing,
    ) {
        Ok(projection) => ApiResponse::ok(projection),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

pub async fn scenario_clinker(
    State(state): State<DashboardState>,
    Json(req): Json<ClinkerRequest>,
) -> Response {
    let config = state.config.as_ref();
    let result = config
        .drivers
        .clinker_factor
        .check(Driver::ClinkerFactor.name(), req.target_clinker_pct)
        .and_then(|target| {
            project_clinker_factor_impact(target, &config.clinker, &config.guardrails)
        });
    match result {
        Ok(projection) => ApiResponse::ok(projection),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

pub async fn scenario_packaging(
    State(state): State<DashboardState>,
    Json(req): Json<PackagingRequest>,
) -> Response {
    let packaging = &state.config.packaging;
    let allowed = packaging.allowed_specs();
    if !allowed.contains(&req.spec_gsm) {
        return ApiErrorResponse::from_engine(&EngineError::UnsupportedSpec {
            gsm: req.spec_gsm,
            allowed,
        });
    }

    match project_packaging_impact(req.spec_gsm, packaging) {
        Ok(projection) => ApiResponse::ok(projection),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

pub async fn scenario_power(
    State(state): State<DashboardState>,
    Json(req): Json<PowerRequest>,
) -> Response {
    let config = state.config.as_ref();
    let result = config
        .drivers
        .gas_utilization
        .check(Driver::GasUtilization.name(), req.gas_utilization_pct)
        .and_then(|gas| project_power_arbitrage(gas, &config.power));
    match result {
        Ok(projection) => ApiResponse::ok(projection),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// An empty body opens a clamp session. Anything else must decode as a
/// [`CreateSessionRequest`].
pub async fn create_session(State(state): State<DashboardState>, body: Bytes) -> Response {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        match serde_json::from_slice::<CreateSessionRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                return ApiErrorResponse::bad_request(format!("invalid session request: {e}"))
            }
        }
    };

    let mut sessions = state.sessions.write().await;
    let limit = state.config.server.max_sessions;
    if sessions.len() >= limit {
        warn!(limit, "Session limit reached, refusing new session");
        return ApiErrorResponse::respond(
            ErrorCode::SessionLimit,
            format!("{limit} scenario sessions are open; delete one before creating another"),
        );
    }

    let session = ScenarioSession::new(&state.config, req.policy);
    let report = match session.project(&state.config) {
        Ok(r) => r,
        Err(e) => return ApiErrorResponse::from_engine(&e),
    };
    sessions.insert(session.id, session.clone());
    drop(sessions);

    ApiResponse::created(SessionView { session, report })
}

pub async fn get_session(
    State(state): State<DashboardState>,
    Path(id): Path<Uuid>,
) -> Response {
    let sessions = state.sessions.read().await;
    match sessions.get(&id) {
        Some(session) => session_view(session, &state.config),
        None => session_not_found(id),
    }
}

pub async fn update_session_drivers(
    State(state): State<DashboardState>,
    Path(id): Path<Uuid>,
    Json(update): Json<DriverUpdate>,
) -> Response {
    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&id) else {
        return session_not_found(id);
    };

    if let Err(e) = session.apply(&state.config, &update) {
        return ApiErrorResponse::from_engine(&e);
    }
    session_view(session, &state.config)
}

pub async fn reset_session(
    State(state): State<DashboardState>,
    Path(id): Path<Uuid>,
) -> Response {
    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&id) else {
        return session_not_found(id);
    };
    session.reset(&state.config);
    session_view(session, &state.config)
}

pub async fn delete_session(
    State(state): State<DashboardState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.sessions.write().await.remove(&id) {
        Some(_) => {
            info!(session = %id, "Scenario session closed");
            ApiResponse::ok(serde_json::json!({ "deleted": id }))
        }
        None => session_not_found(id),
    }
}

// ============================================================================
// Insights
// ============================================================================

pub async fn ask_insight(Json(req): Json<AskRequest>) -> Response {
    if req.question.trim().is_empty() {
        return ApiErrorResponse::bad_request("question must not be empty");
    }
    ApiResponse::ok(insights::ask(&req.question))
}

pub async fn insight_presets() -> Response {
    ApiResponse::ok(
        PRESET_QUESTIONS
            .iter()
            .map(|&(question, topic)| PresetQuestion { question, topic })
            .collect::<Vec<_>>(),
    )
}
