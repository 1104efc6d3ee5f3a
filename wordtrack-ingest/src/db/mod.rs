//! Database access for wordtrack-ingest
//!
//! Schema creation and pool setup live in `wordtrack_common::db`; this module
//! holds the word store used by the pipeline and the control API.

pub mod words;

pub use words::{SqliteWordStore, WordStore, RECENT_LIMIT};
