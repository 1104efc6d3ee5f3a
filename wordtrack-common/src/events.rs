//! Event types for the WordTrack event system
//!
//! Every per-token outcome of the ingestion pipeline, every monitoring state
//! change and every user command is published on the [`EventBus`]. Events
//! are serializable so they can be forwarded over SSE unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::db::WordId;

/// WordTrack event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WordEvent {
    /// Clipboard monitoring was switched on
    MonitoringStarted { timestamp: DateTime<Utc> },

    /// Clipboard monitoring was switched off; in-flight work was cancelled
    MonitoringStopped { timestamp: DateTime<Utc> },

    /// Clipboard content changed and was handed to the pipeline
    ClipboardReceived {
        /// Number of candidate tokens extracted
        token_count: usize,
        source_app: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// First observation of a word; a new row was created
    WordInserted {
        id: WordId,
        word: String,
        /// Whether the dictionary supplied a definition
        enriched: bool,
        timestamp: DateTime<Utc>,
    },

    /// Known word seen again; usage count went up by one
    WordIncremented {
        id: WordId,
        word: String,
        timestamp: DateTime<Utc>,
    },

    /// Another event created the word first; this insert was dropped
    InsertSkipped {
        id: WordId,
        word: String,
        timestamp: DateTime<Utc>,
    },

    /// Dictionary lookup produced no definition (recoverable)
    EnrichmentFailed {
        word: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Store error aborted processing of one token
    TokenFailed {
        word: String,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// All tokens of one clipboard event have been processed
    IngestCompleted {
        inserted: usize,
        incremented: usize,
        skipped: usize,
        failed: usize,
        cancelled: usize,
        timestamp: DateTime<Utc>,
    },

    /// Favorite flag changed
    WordFavorited {
        id: WordId,
        favorite: bool,
        timestamp: DateTime<Utc>,
    },

    /// Single word removed by the user
    WordDeleted { id: WordId, timestamp: DateTime<Utc> },

    /// Whole collection removed by the user
    AllWordsDeleted {
        removed: u64,
        timestamp: DateTime<Utc>,
    },
}

impl WordEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            WordEvent::MonitoringStarted { .. } => "MonitoringStarted",
            WordEvent::MonitoringStopped { .. } => "MonitoringStopped",
            WordEvent::ClipboardReceived { .. } => "ClipboardReceived",
            WordEvent::WordInserted { .. } => "WordInserted",
            WordEvent::WordIncremented { .. } => "WordIncremented",
            WordEvent::InsertSkipped { .. } => "InsertSkipped",
            WordEvent::EnrichmentFailed { .. } => "EnrichmentFailed",
            WordEvent::TokenFailed { .. } => "TokenFailed",
            WordEvent::IngestCompleted { .. } => "IngestCompleted",
            WordEvent::WordFavorited { .. } => "WordFavorited",
            WordEvent::WordDeleted { .. } => "WordDeleted",
            WordEvent::AllWordsDeleted { .. } => "AllWordsDeleted",
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`: publishing never blocks, slow
/// subscribers see `Lagged` instead of stalling the pipeline, and
/// receivers are cleaned up when dropped.
///
/// # Examples
///
/// ```
/// use wordtrack_common::events::{EventBus, WordEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(WordEvent::MonitoringStarted {
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.event_type(), "MonitoringStarted");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WordEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<WordEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, returning the number of subscribers that received it
    ///
    /// Fails when nobody is subscribed.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: WordEvent,
    ) -> Result<usize, broadcast::error::SendError<WordEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WordEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
