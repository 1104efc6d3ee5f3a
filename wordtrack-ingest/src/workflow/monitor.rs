//! Clipboard monitor
//!
//! Owns the monitoring flag. While on, a listener task holds a subscription
//! to the clipboard source and spawns one pipeline task per event onto a
//! [`TaskTracker`]. Switching off cancels the session's token, drops the
//! subscription and waits until every spawned task has wound down, so a
//! later `start()` always begins with a fresh, empty task set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use wordtrack_common::events::{EventBus, WordEvent};

use super::IngestionPipeline;
use crate::clipboard::{ClipboardEvent, ClipboardSource};

struct ActiveSession {
    cancel: CancellationToken,
    tracker: TaskTracker,
    listener: JoinHandle<()>,
}

pub struct ClipboardMonitor {
    source: Arc<dyn ClipboardSource>,
    pipeline: Arc<IngestionPipeline>,
    event_bus: EventBus,
    session: Mutex<Option<ActiveSession>>,
    monitoring: AtomicBool,
}

impl ClipboardMonitor {
    pub fn new(
        source: Arc<dyn ClipboardSource>,
        pipeline: Arc<IngestionPipeline>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            source,
            pipeline,
            event_bus,
            session: Mutex::new(None),
            monitoring: AtomicBool::new(false),
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::SeqCst)
    }

    /// Begin monitoring; returns false if already on
    pub async fn start(&self) -> bool {
        let mut session = self.session.lock().await;
        if session.is_some() {
            return false;
        }

        let receiver = self.source.subscribe();
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        let listener = tokio::spawn(listen(
            receiver,
            self.pipeline.clone(),
            cancel.clone(),
            tracker.clone(),
        ));

        *session = Some(ActiveSession {
            cancel,
            tracker,
            listener,
        });
        self.monitoring.store(true, Ordering::SeqCst);

        info!("Clipboard monitoring started");
        self.event_bus.emit_lossy(WordEvent::MonitoringStarted {
            timestamp: Utc::now(),
        });

        true
    }

    /// Stop monitoring and wait for in-flight work; returns false if already off
    pub async fn stop(&self) -> bool {
        let mut session = self.session.lock().await;
        let Some(active) = session.take() else {
            return false;
        };
        self.monitoring.store(false, Ordering::SeqCst);

        active.cancel.cancel();
        if let Err(e) = active.listener.await {
            warn!(error = %e, "Clipboard listener ended abnormally");
        }

        active.tracker.close();
        let pending = active.tracker.len();
        if pending > 0 {
            debug!(pending, "Waiting for in-flight ingest tasks");
        }
        active.tracker.wait().await;

        // Held until drained so a concurrent start() cannot overlap this session
        drop(session);

        info!("Clipboard monitoring stopped");
        self.event_bus.emit_lossy(WordEvent::MonitoringStopped {
            timestamp: Utc::now(),
        });

        true
    }

    /// Flip monitoring; returns the new state
    pub async fn toggle(&self) -> bool {
        if self.is_monitoring() {
            self.stop().await;
        } else {
            self.start().await;
        }
        self.is_monitoring()
    }
}

async fn listen(
    mut receiver: broadcast::Receiver<ClipboardEvent>,
    pipeline: Arc<IngestionPipeline>,
    cancel: CancellationToken,
    tracker: TaskTracker,
) {
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            received = receiver.recv() => match received {
                Ok(event) => {
                    if event.is_blank() {
                        debug!("Skipping blank clipboard text");
                        continue;
                    }

                    let pipeline = pipeline.clone();
                    let cancel = cancel.clone();
                    tracker.spawn(async move {
                        pipeline.ingest_until_cancelled(&event, &cancel).await;
                    });
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Clipboard listener lagged, events dropped");
                }
                Err(RecvError::Closed) => {
                    info!("Clipboard source closed");
                    break;
                }
            },
        }
    }

    // Dropping the receiver here unsubscribes from the source
    debug!("Clipboard listener exiting");
}
