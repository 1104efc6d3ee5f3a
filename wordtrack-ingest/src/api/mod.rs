//! HTTP control API for wordtrack-ingest
//!
//! Commands and queries for the external presentation layer, plus the intake
//! endpoint for the platform clipboard agent.

pub mod clipboard;
pub mod health;
pub mod monitoring;
pub mod sse;
pub mod words;

pub use clipboard::clipboard_routes;
pub use health::health_routes;
pub use monitoring::monitoring_routes;
pub use sse::event_stream;
pub use words::word_routes;
