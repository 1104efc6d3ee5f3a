//! Monitoring control endpoints
//!
//! The presentation layer's on/off switch. `changed` tells the caller whether
//! the request actually flipped the state.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct MonitoringStatus {
    pub monitoring: bool,
    #[serde(default)]
    pub changed: bool,
}

/// GET /monitoring
pub async fn get_monitoring(State(state): State<AppState>) -> Json<MonitoringStatus> {
    Json(MonitoringStatus {
        monitoring: state.monitor.is_monitoring(),
        changed: false,
    })
}

/// POST /monitoring/start
pub async fn start_monitoring(State(state): State<AppState>) -> Json<MonitoringStatus> {
    let changed = state.monitor.start().await;
    info!(changed, "Start monitoring requested");
    Json(MonitoringStatus {
        monitoring: state.monitor.is_monitoring(),
        changed,
    })
}

/// POST /monitoring/stop
///
/// Returns once in-flight ingestion has been cancelled and drained.
pub async fn stop_monitoring(State(state): State<AppState>) -> Json<MonitoringStatus> {
    let changed = state.monitor.stop().await;
    info!(changed, "Stop monitoring requested");
    Json(MonitoringStatus {
        monitoring: state.monitor.is_monitoring(),
        changed,
    })
}

/// POST /monitoring/toggle
pub async fn toggle_monitoring(State(state): State<AppState>) -> Json<MonitoringStatus> {
    let monitoring = state.monitor.toggle().await;
    info!(monitoring, "Monitoring toggled");
    Json(MonitoringStatus {
        monitoring,
        changed: true,
    })
}

pub fn monitoring_routes() -> Router<AppState> {
    Router::new()
        .route("/monitoring", get(get_monitoring))
        .route("/monitoring/start", post(start_monitoring))
        .route("/monitoring/stop", post(stop_monitoring))
        .route("/monitoring/toggle", post(toggle_monitoring))
}
