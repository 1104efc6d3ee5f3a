//! Clipboard intake endpoints
//!
//! `POST /clipboard` is what the platform clipboard agent calls on every
//! change. It only publishes to the clipboard source, so the text is dropped
//! when monitoring is off. `POST /ingest` bypasses the monitor and runs the
//! pipeline inline, returning the per-token report.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clipboard::ClipboardEvent;
use crate::workflow::IngestReport;
use crate::{ApiError, ApiResult, AppState};

/// Copied text as posted by the clipboard agent
#[derive(Debug, Deserialize, Serialize)]
pub struct ClipboardRequest {
    pub text: String,
    #[serde(default)]
    pub source_app: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClipboardResponse {
    /// False when monitoring is off and the text was discarded
    pub delivered: bool,
}

/// POST /clipboard
pub async fn post_clipboard(
    State(state): State<AppState>,
    Json(request): Json<ClipboardRequest>,
) -> (StatusCode, Json<ClipboardResponse>) {
    let listeners = state
        .clipboard
        .publish(ClipboardEvent::new(request.text, request.source_app));
    debug!(listeners, "Clipboard change published");

    (
        StatusCode::ACCEPTED,
        Json(ClipboardResponse {
            delivered: listeners > 0,
        }),
    )
}

/// POST /ingest
pub async fn post_ingest(
    State(state): State<AppState>,
    Json(request): Json<ClipboardRequest>,
) -> ApiResult<Json<IngestReport>> {
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be blank".to_string()));
    }

    let report = state
        .pipeline
        .ingest(&request.text, request.source_app.as_deref())
        .await;

    Ok(Json(report))
}

pub fn clipboard_routes() -> Router<AppState> {
    Router::new()
        .route("/clipboard", post(post_clipboard))
        .route("/ingest", post(post_ingest))
}
