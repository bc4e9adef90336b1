//! HTTP Boundary for the Fleet Engine
//!
//! Thin axum layer over a shared `FleetEngine`:
//! - `GET  /api/machines`            one tick, JSON keyed by machine id
//! - `GET  /api/report?machine=ID`   text report of the current state
//! - `POST /api/reset`               drop the fleet
//! - `POST /api/machines/{id}/fault` schedule a fault excursion
//! - `GET  /health`, `GET /metrics`
//!
//! Every request that touches the engine takes the single engine lock, so a
//! tick's advance, analysis and assembly never interleave with another's.

use crate::config::{EngineConfig, FleetLayout};
use crate::engine::{FleetEngine, FleetSnapshot};
use crate::error::FleetError;
use crate::report;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use once_cell::sync::Lazy;
use prometheus::{Counter, Encoder, Gauge, Histogram, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};

// ============================================================================
// METRICS
// ============================================================================

pub static TICKS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new("fleetwatch_ticks_total", "Total simulation ticks served").unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static ANOMALIES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new("fleetwatch_anomalies_total", "Total machine anomalies flagged").unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static TICK_FAILURES: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new("fleetwatch_tick_failures_total", "Ticks aborted by a fatal error").unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static TICK_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    let h = Histogram::with_opts(prometheus::HistogramOpts::new(
        "fleetwatch_tick_duration_seconds",
        "Histogram of tick latency",
    ))
    .unwrap();
    prometheus::register(Box::new(h.clone())).unwrap();
    h
});

pub static FLEET_SIZE: Lazy<Gauge> = Lazy::new(|| {
    let g = Gauge::new("fleetwatch_fleet_size", "Number of simulated machines").unwrap();
    prometheus::register(Box::new(g.clone())).unwrap();
    g
});

// ============================================================================
// CONFIG & STATE
// ============================================================================

/// Gateway configuration, read from the environment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to (default: 127.0.0.1)
    pub host: String,
    /// Port to listen on (default: 5000)
    pub port: u16,
    /// Simulation seed; unset means OS entropy
    pub seed: Option<u64>,
    /// Use the five-machine layout
    pub extended_layout: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            seed: None,
            extended_layout: false,
        }
    }
}

impl GatewayConfig {
    /// `FLEETWATCH_HOST`, `FLEETWATCH_PORT`, `FLEETWATCH_SEED`,
    /// `FLEETWATCH_LAYOUT=extended`. Unparseable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str| std::env::var(key).ok();

        Self {
            host: var("FLEETWATCH_HOST").unwrap_or(defaults.host),
            port: var("FLEETWATCH_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            seed: var("FLEETWATCH_SEED").and_then(|v| v.parse().ok()),
            extended_layout: var("FLEETWATCH_LAYOUT").is_some_and(|v| v == "extended"),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let layout = if self.extended_layout {
            FleetLayout::extended()
        } else {
            FleetLayout::default()
        };

        EngineConfig {
            seed: self.seed,
            layout,
            ..Default::default()
        }
    }
}

/// Thread-safe handle to the engine
pub type SharedEngine = Arc<Mutex<FleetEngine>>;

#[derive(Clone)]
pub struct AppState {
    engine: SharedEngine,
}

impl AppState {
    pub fn new(engine: FleetEngine) -> Self {
        FLEET_SIZE.set(engine.machine_ids().len() as f64);
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, FleetEngine>, ApiError> {
        self.engine.lock().map_err(|_| ApiError::LockPoisoned)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Engine(FleetError),
    LockPoisoned,
}

impl From<FleetError> for ApiError {
    fn from(e: FleetError) -> Self {
        ApiError::Engine(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Engine(e @ FleetError::UnknownMachine(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            ApiError::Engine(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::LockPoisoned => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "engine unavailable after a failed tick".to_string(),
            ),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

fn run_tick(state: &AppState) -> Result<FleetSnapshot, ApiError> {
    let timer = TICK_LATENCY.start_timer();
    let result = state.lock()?.tick();
    timer.observe_duration();

    match result {
        Ok(snapshot) => {
            TICKS_TOTAL.inc();
            let anomalies = snapshot.values().filter(|r| r.anomaly).count();
            ANOMALIES_TOTAL.inc_by(anomalies as f64);
            Ok(snapshot)
        }
        Err(e) => {
            TICK_FAILURES.inc();
            error!(error = %e, "Tick failed.");
            Err(e.into())
        }
    }
}

async fn machines_handler(
    State(state): State<AppState>,
) -> Result<Json<FleetSnapshot>, ApiError> {
    run_tick(&state).map(Json)
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default = "default_machine")]
    pub machine: String,
}

fn default_machine() -> String {
    "Machine_1".to_string()
}

async fn report_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<String, ApiError> {
    let snapshot = state.lock()?.observe()?;
    let record = snapshot
        .get(&query.machine)
        .ok_or_else(|| FleetError::UnknownMachine(query.machine.clone()))?;

    Ok(report::render(&query.machine, record, chrono::Utc::now()))
}

async fn reset_handler(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.lock()?.reset();
    info!("Fleet reset requested.");
    Ok(StatusCode::NO_CONTENT)
}

async fn fault_handler(
    State(state): State<AppState>,
    Path(machine): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.lock()?.inject_fault(&machine)?;
    Ok(StatusCode::ACCEPTED)
}

async fn metrics_handler() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Metrics encoding failed.");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

async fn health_handler() -> &'static str {
    "OK"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/machines", get(machines_handler))
        .route("/api/machines/{id}/fault", post(fault_handler))
        .route("/api/report", get(report_handler))
        .route("/api/reset", post(reset_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_engine_config() {
        let config = GatewayConfig {
            seed: Some(3),
            extended_layout: true,
            ..Default::default()
        };

        let engine = config.engine_config();
        assert_eq!(engine.seed, Some(3));
        assert_eq!(engine.layout.len(), 5);
        assert_eq!(config.addr(), "127.0.0.1:5000");
    }

    #[test]
    fn test_unknown_machine_maps_to_not_found() {
        let response =
            ApiError::Engine(FleetError::UnknownMachine("Machine_9".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::Engine(FleetError::InvariantViolation {
            machine: "Machine_1".to_string(),
            detail: "history lengths differ".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
