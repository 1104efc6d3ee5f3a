//! Clipboard change notifications
//!
//! The platform clipboard agent lives outside this service. It posts copied
//! text to `POST /clipboard`, which publishes onto a [`ClipboardBus`]; the
//! monitor holds a subscription only while monitoring is on.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default number of unread events buffered per subscriber
pub const DEFAULT_CLIPBOARD_CAPACITY: usize = 64;

/// One clipboard change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardEvent {
    pub copied_text: String,
    /// Identifier of the application that owned the clipboard, if known
    pub source_app: Option<String>,
}

impl ClipboardEvent {
    pub fn new(copied_text: impl Into<String>, source_app: Option<String>) -> Self {
        Self {
            copied_text: copied_text.into(),
            source_app,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.copied_text.trim().is_empty()
    }
}

/// Anything that can deliver clipboard changes as a channel
pub trait ClipboardSource: Send + Sync {
    /// Start receiving events; dropping the receiver unsubscribes
    fn subscribe(&self) -> broadcast::Receiver<ClipboardEvent>;
}

/// Broadcast-backed clipboard source
#[derive(Clone)]
pub struct ClipboardBus {
    tx: broadcast::Sender<ClipboardEvent>,
}

impl ClipboardBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a clipboard change
    ///
    /// Returns how many listeners received it. Zero means monitoring is off
    /// and the change was dropped.
    pub fn publish(&self, event: ClipboardEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ClipboardBus {
    fn default() -> Self {
        Self::new(DEFAULT_CLIPBOARD_CAPACITY)
    }
}

impl ClipboardSource for ClipboardBus {
    fn subscribe(&self) -> broadcast::Receiver<ClipboardEvent> {
        self.tx.subscribe()
    }
}
