//! wordtrack-ingest library interface
//!
//! Clipboard vocabulary ingestion: tokenizer, dictionary enrichment, word
//! store, the ingestion pipeline and its monitor, and the HTTP control API.

pub mod api;
pub mod clipboard;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod tokenizer;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use wordtrack_common::config::PipelineSettings;
use wordtrack_common::events::EventBus;

use crate::clipboard::ClipboardBus;
use crate::db::WordStore;
use crate::services::DictionaryClient;
use crate::workflow::{ClipboardMonitor, IngestionPipeline};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WordStore>,
    pub pipeline: Arc<IngestionPipeline>,
    pub monitor: Arc<ClipboardMonitor>,
    /// Clipboard source fed by `POST /clipboard`
    pub clipboard: ClipboardBus,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the pipeline, monitor and clipboard source around a store and dictionary
    pub fn new(
        store: Arc<dyn WordStore>,
        dictionary: Arc<dyn DictionaryClient>,
        event_bus: EventBus,
        settings: PipelineSettings,
    ) -> Self {
        let clipboard = ClipboardBus::default();
        let pipeline = Arc::new(IngestionPipeline::new(
            store.clone(),
            dictionary,
            event_bus.clone(),
            settings,
        ));
        let monitor = Arc::new(ClipboardMonitor::new(
            Arc::new(clipboard.clone()),
            pipeline.clone(),
            event_bus.clone(),
        ));

        Self {
            store,
            pipeline,
            monitor,
            clipboard,
            event_bus,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::health_routes())
        .merge(api::monitoring_routes())
        .merge(api::clipboard_routes())
        .merge(api::word_routes())
        .route("/events", get(api::event_stream))
        .with_state(state)
}
