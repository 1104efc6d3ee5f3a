//! Clipboard ingestion workflow
//!
//! - [`pipeline`]: tokenize one clipboard event and run every token through
//!   the lookup / increment / enrich / insert state machine
//! - [`monitor`]: the on/off switch that feeds clipboard events into the
//!   pipeline and cancels in-flight work when switched off

pub mod monitor;
pub mod pipeline;

pub use monitor::ClipboardMonitor;
pub use pipeline::IngestionPipeline;

use serde::Serialize;
use wordtrack_common::db::WordId;

/// What happened to one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TokenOutcome {
    /// First observation; `enriched` is false when the dictionary gave nothing
    Inserted { id: WordId, enriched: bool },
    /// Known word; usage count went up by one
    Incremented { id: WordId },
    /// A concurrent task created the row first
    InsertSkipped { id: WordId },
    /// Store error; nothing was written for this token
    Failed { error: String },
    /// Monitoring was stopped before the token finished
    Cancelled,
}

/// Outcome of one token, keyed by canonical word
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResult {
    pub word: String,
    #[serde(flatten)]
    pub outcome: TokenOutcome,
}

/// Summary of one clipboard event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    /// Inserted without a definition
    pub unenriched: usize,
    pub incremented: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Per-token outcomes in completion order
    pub tokens: Vec<TokenResult>,
}

impl IngestReport {
    pub fn record(&mut self, result: TokenResult) {
        match &result.outcome {
            TokenOutcome::Inserted { enriched, .. } => {
                self.inserted += 1;
                if !enriched {
                    self.unenriched += 1;
                }
            }
            TokenOutcome::Incremented { .. } => self.incremented += 1,
            TokenOutcome::InsertSkipped { .. } => self.skipped += 1,
            TokenOutcome::Failed { .. } => self.failed += 1,
            TokenOutcome::Cancelled => self.cancelled += 1,
        }
        self.tokens.push(result);
    }

    pub fn total(&self) -> usize {
        self.tokens.len()
    }

    /// Outcome for a canonical word, if it was part of this event
    pub fn outcome_for(&self, word: &str) -> Option<&TokenOutcome> {
        self.tokens
            .iter()
            .find(|t| t.word == word)
            .map(|t| &t.outcome)
    }
}
