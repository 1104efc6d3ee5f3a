//! Test Helper Utilities
//!
//! Shared utilities for testing wordtrack-ingest

#![allow(dead_code)]

pub mod db_utils;
pub mod dictionary_doubles;
pub mod mock_dictionary_server;

// Re-export commonly used items
pub use db_utils::{create_test_store, FlakyStore};
pub use dictionary_doubles::{FailingDictionary, ScriptedDictionary};
pub use mock_dictionary_server::spawn_mock_dictionary;
