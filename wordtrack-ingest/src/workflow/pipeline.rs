//! Ingestion pipeline
//!
//! Turns one clipboard event into store writes. Each distinct token walks a
//! small state machine:
//!
//! ```text
//! Lookup ──found──▶ Existing ──▶ increment usage
//!    │                 │
//!    │              (row deleted meanwhile)
//!    ▼                 ▼
//! Absent ──▶ enrich via dictionary ──▶ Insert (ON CONFLICT DO NOTHING)
//! ```
//!
//! Tokens of one event are grouped by canonical word. Groups run concurrently
//! up to `token_concurrency`; the occurrences inside a group run one after
//! another, so `Word word WORD` inserts once and increments twice.
//!
//! Separate events are not coordinated: two first observations of a word
//! racing each other both reach `Insert`, the UNIQUE constraint keeps one row
//! and the loser reports `InsertSkipped`. The loser's count of one is
//! dropped, so the usage count may under-count concurrent first sightings.
//!
//! # Error Handling
//! - Dictionary failures degrade to an entry without enrichment
//! - A store error aborts only its own token
//! - No retries

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wordtrack_common::config::PipelineSettings;
use wordtrack_common::db::{Enrichment, NewWord, Provenance, WordId};
use wordtrack_common::events::{EventBus, WordEvent};
use wordtrack_common::Error;

use super::{IngestReport, TokenOutcome, TokenResult};
use crate::clipboard::ClipboardEvent;
use crate::db::WordStore;
use crate::services::DictionaryClient;
use crate::tokenizer::{canonical_key, tokenize};

/// Per-token processing state
#[derive(Debug)]
enum Step {
    Lookup,
    Existing(WordId),
    Absent,
    Insert(NewWord),
}

/// Fold tokens onto their canonical word, keeping first-occurrence order
fn group_by_word(tokens: Vec<String>) -> Vec<(String, usize)> {
    let mut groups: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for token in tokens {
        let word = canonical_key(&token);
        match index.get(&word) {
            Some(&slot) => groups[slot].1 += 1,
            None => {
                index.insert(word.clone(), groups.len());
                groups.push((word, 1));
            }
        }
    }

    groups
}

/// Clipboard text → word store orchestrator
pub struct IngestionPipeline {
    store: Arc<dyn WordStore>,
    dictionary: Arc<dyn DictionaryClient>,
    event_bus: EventBus,
    settings: PipelineSettings,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn WordStore>,
        dictionary: Arc<dyn DictionaryClient>,
        event_bus: EventBus,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            dictionary,
            event_bus,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Ingest copied text to completion
    pub async fn ingest(&self, copied_text: &str, source_app: Option<&str>) -> IngestReport {
        let event = ClipboardEvent::new(copied_text, source_app.map(str::to_string));
        self.ingest_until_cancelled(&event, &CancellationToken::new())
            .await
    }

    /// Ingest one clipboard event, abandoning unfinished tokens once `cancel` fires
    ///
    /// Tokens still waiting or in flight at cancellation are reported as
    /// [`TokenOutcome::Cancelled`]. Every store write is a single statement, so
    /// a cancelled token has either written its row completely or not at all.
    pub async fn ingest_until_cancelled(
        &self,
        event: &ClipboardEvent,
        cancel: &CancellationToken,
    ) -> IngestReport {
        if event.is_blank() {
            debug!("Ignoring blank clipboard text");
            return IngestReport::default();
        }

        let tokens = tokenize(&event.copied_text);
        info!(
            tokens = tokens.len(),
            source_app = ?event.source_app,
            "Clipboard event received"
        );
        self.event_bus.emit_lossy(WordEvent::ClipboardReceived {
            token_count: tokens.len(),
            source_app: event.source_app.clone(),
            timestamp: Utc::now(),
        });

        let provenance = Provenance {
            source_app: event.source_app.clone(),
            copied_text: Some(event.copied_text.clone()),
        };

        let width = self.settings.token_concurrency.max(1);
        let results: Vec<Vec<TokenResult>> = stream::iter(group_by_word(tokens))
            .map(|(word, occurrences)| {
                self.process_word_group(word, occurrences, &provenance, cancel)
            })
            .buffer_unordered(width)
            .collect()
            .await;

        let mut report = IngestReport::default();
        for result in results.into_iter().flatten() {
            report.record(result);
        }

        info!(
            inserted = report.inserted,
            incremented = report.incremented,
            skipped = report.skipped,
            failed = report.failed,
            cancelled = report.cancelled,
            "Clipboard event processed"
        );
        self.event_bus.emit_lossy(WordEvent::IngestCompleted {
            inserted: report.inserted,
            incremented: report.incremented,
            skipped: report.skipped,
            failed: report.failed,
            cancelled: report.cancelled,
            timestamp: Utc::now(),
        });

        report
    }

    /// Process every occurrence of one word in sequence
    async fn process_word_group(
        &self,
        word: String,
        occurrences: usize,
        provenance: &Provenance,
        cancel: &CancellationToken,
    ) -> Vec<TokenResult> {
        let mut results = Vec::with_capacity(occurrences);

        for _ in 0..occurrences {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(word = %word, "Token cancelled");
                    TokenOutcome::Cancelled
                }
                outcome = self.process_token(&word, provenance) => outcome,
            };
            results.push(TokenResult {
                word: word.clone(),
                outcome,
            });
        }

        results
    }

    /// Run the state machine for one canonical word
    async fn process_token(&self, word: &str, provenance: &Provenance) -> TokenOutcome {
        let mut step = Step::Lookup;

        loop {
            step = match step {
                Step::Lookup => match self.store.lookup(word).await {
                    Ok(Some(entry)) => Step::Existing(entry.id),
                    Ok(None) => Step::Absent,
                    Err(e) => return self.token_failed(word, e),
                },

                Step::Existing(id) => {
                    let result = if self.settings.refresh_provenance {
                        self.store.increment_usage_with_provenance(id, provenance).await
                    } else {
                        self.store.increment_usage(id).await
                    };

                    match result {
                        Ok(()) => {
                            debug!(word = %word, id, "Usage incremented");
                            self.event_bus.emit_lossy(WordEvent::WordIncremented {
                                id,
                                word: word.to_string(),
                                timestamp: Utc::now(),
                            });
                            return TokenOutcome::Incremented { id };
                        }
                        Err(e) if e.is_missing_word() => {
                            debug!(word = %word, id, "Word deleted before increment, re-creating");
                            Step::Absent
                        }
                        Err(e) => return self.token_failed(word, e),
                    }
                }

                Step::Absent => {
                    let enrichment = self.enrich(word).await;
                    Step::Insert(NewWord::new(word, enrichment, provenance.clone()))
                }

                Step::Insert(new_word) => {
                    let enriched = new_word.enrichment.definition.is_some();

                    match self.store.insert_if_absent(&new_word).await {
                        Ok((id, true)) => {
                            debug!(word = %word, id, enriched, "Word inserted");
                            self.event_bus.emit_lossy(WordEvent::WordInserted {
                                id,
                                word: word.to_string(),
                                enriched,
                                timestamp: Utc::now(),
                            });
                            return TokenOutcome::Inserted { id, enriched };
                        }
                        Ok((id, false)) => {
                            debug!(word = %word, id, "Insert skipped, word already stored");
                            self.event_bus.emit_lossy(WordEvent::InsertSkipped {
                                id,
                                word: word.to_string(),
                                timestamp: Utc::now(),
                            });
                            return TokenOutcome::InsertSkipped { id };
                        }
                        Err(e) => return self.token_failed(word, e),
                    }
                }
            };
        }
    }

    /// Dictionary lookup; whatever is missing is stored as null
    async fn enrich(&self, word: &str) -> Enrichment {
        let (enrichment, reason) = match self.dictionary.lookup_definition(word).await {
            Ok(Some(definition)) if definition.text.is_some() => return definition.into(),
            Ok(Some(partial)) => (partial.into(), "entry has no definition".to_string()),
            Ok(None) => (Enrichment::default(), "no definition found".to_string()),
            Err(e) => (Enrichment::default(), e.to_string()),
        };

        warn!(word = %word, reason = %reason, "Enrichment failed, storing word without definition");
        self.event_bus.emit_lossy(WordEvent::EnrichmentFailed {
            word: word.to_string(),
            reason,
            timestamp: Utc::now(),
        });

        enrichment
    }

    fn token_failed(&self, word: &str, e: Error) -> TokenOutcome {
        error!(word = %word, error = %e, "Store error, token aborted");
        self.event_bus.emit_lossy(WordEvent::TokenFailed {
            word: word.to_string(),
            error: e.to_string(),
            timestamp: Utc::now(),
        });
        TokenOutcome::Failed {
            error: e.to_string(),
        }
    }
}
