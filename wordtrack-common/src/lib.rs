//! # WordTrack Common Library
//!
//! Shared code for the WordTrack crates:
//! - Word models and SQLite schema
//! - Event types (WordEvent enum) and the EventBus
//! - Configuration loading and root folder resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
