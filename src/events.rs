//! Log event fan-out to observers
//!
//! Each subscriber owns an independent unbounded queue. The producer never waits
//! for a subscriber and never drops an event for a slow one: events pile up in that
//! subscriber's queue until it drains them. A subscriber whose receiver was dropped
//! is pruned on the next emit without affecting the others.
//!
//! Every emitted event is also forwarded to `tracing`, so process-level sinks see
//! the same records as the observers.

use crate::types::{EventKind, LogEvent, Severity};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Broadcasts [`LogEvent`]s to every live subscriber
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<LogEvent>>>>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer; it receives every event emitted from now on
    pub fn subscribe(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_subscribers().push(tx);
        EventReceiver { rx }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }

    /// Emit an event to `tracing` and to every subscriber
    pub fn emit(&self, severity: Severity, kind: EventKind, message: impl Into<String>) {
        self.publish(LogEvent::now(severity, kind, message));
    }

    /// Publish a prepared event
    pub fn publish(&self, event: LogEvent) {
        match event.severity {
            Severity::Debug => tracing::debug!(kind = ?event.kind, "{}", event.message),
            Severity::Info => tracing::info!(kind = ?event.kind, "{}", event.message),
            Severity::Warning => tracing::warn!(kind = ?event.kind, "{}", event.message),
            Severity::Error => tracing::error!(kind = ?event.kind, "{}", event.message),
        }

        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Shorthand for an informational event
    pub fn info(&self, kind: EventKind, message: impl Into<String>) {
        self.emit(Severity::Info, kind, message);
    }

    /// Shorthand for a warning event
    pub fn warn(&self, kind: EventKind, message: impl Into<String>) {
        self.emit(Severity::Warning, kind, message);
    }

    /// Shorthand for an error event
    pub fn error(&self, kind: EventKind, message: impl Into<String>) {
        self.emit(Severity::Error, kind, message);
    }

    // A poisoned lock only means another emitter panicked mid-send; the list is still usable.
    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<LogEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiving end held by one observer
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<LogEvent>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once the bus is gone and the queue is empty
    pub async fn recv(&mut self) -> Option<LogEvent> {
        self.rx.recv().await
    }

    /// Take the next queued event without waiting
    pub fn try_recv(&mut self) -> Option<LogEvent> {
        self.rx.try_recv().ok()
    }

    /// Take everything queued so far, for observers that poll on a fixed cadence
    pub fn drain(&mut self) -> Vec<LogEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
