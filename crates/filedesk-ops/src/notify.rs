//! Success notification fan-out.

use std::sync::Arc;

use tokio::sync::broadcast;

use filedesk_core::{Action, FileSystemEvent};

use crate::services::{EventSink, FileSystemActionListener};

/// Orchestrator-owned registry of event sinks and action listeners.
///
/// Registration happens at setup time through `&mut self`; delivery only
/// iterates. Both lists are notified in registration order.
pub struct NotificationBus {
    sinks: Vec<Arc<dyn EventSink>>,
    listeners: Vec<Arc<dyn FileSystemActionListener>>,
    events_tx: broadcast::Sender<FileSystemEvent>,
}

impl NotificationBus {
    /// Create a bus whose broadcast channel holds `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            sinks: Vec::new(),
            listeners: Vec::new(),
            events_tx,
        }
    }

    /// Register an event sink.
    pub fn add_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Register an action listener.
    pub fn add_listener(&mut self, listener: Arc<dyn FileSystemActionListener>) {
        self.listeners.push(listener);
    }

    /// Subscribe to published events.
    pub fn subscribe(&self) -> broadcast::Receiver<FileSystemEvent> {
        self.events_tx.subscribe()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver an event to every sink, then to broadcast subscribers.
    pub fn publish(&self, event: &FileSystemEvent) {
        for sink in &self.sinks {
            sink.publish(event);
        }
        // No subscribers is not an error.
        let _ = self.events_tx.send(event.clone());
    }

    /// Tell every listener that an action completed.
    pub fn notify(&self, action: Action) {
        tracing::debug!(%action, listeners = self.listeners.len(), "notifying listeners");
        for listener in &self.listeners {
            listener.on_file_system_action(action);
        }
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(crate::EVENT_CHANNEL_SIZE)
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("sinks", &self.sinks.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
