//! In-process DictionaryClient doubles

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wordtrack_ingest::services::{Definition, DictionaryClient, DictionaryError};

/// Answers from a fixed table, optionally after a delay
///
/// Unknown words get `Ok(None)`.
#[derive(Default)]
pub struct ScriptedDictionary {
    entries: HashMap<String, Definition>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, word: &str, text: &str, part_of_speech: &str) -> Self {
        self.entries.insert(
            word.to_string(),
            Definition {
                text: Some(text.to_string()),
                pronunciation: None,
                part_of_speech: Some(part_of_speech.to_string()),
            },
        );
        self
    }

    /// Entry with a pronunciation but no definition text
    pub fn with_pronunciation_only(mut self, word: &str, pronunciation: &str) -> Self {
        self.entries.insert(
            word.to_string(),
            Definition {
                text: None,
                pronunciation: Some(pronunciation.to_string()),
                part_of_speech: None,
            },
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DictionaryClient for ScriptedDictionary {
    async fn lookup_definition(&self, word: &str) -> Result<Option<Definition>, DictionaryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.entries.get(word).cloned())
    }
}

/// Always fails as if the network were down
#[derive(Default)]
pub struct FailingDictionary {
    calls: AtomicUsize,
}

impl FailingDictionary {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DictionaryClient for FailingDictionary {
    async fn lookup_definition(&self, _word: &str) -> Result<Option<Definition>, DictionaryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DictionaryError::NetworkError("connection refused".to_string()))
    }
}
