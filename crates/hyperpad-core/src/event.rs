//! Event system for editor notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Hosts (autosave, the preview reloader, the CLI) want to know when text
//! settles. Instead of holding callbacks into each other, components emit
//! values on a `tokio::sync::broadcast` channel and every subscriber gets
//! its own copy.

use hyperpad_syntax::HighlightSpan;
use tokio::sync::broadcast;

use crate::document::DocumentId;

/// Events emitted by the editing core.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Text settled after a highlight pass, or was replaced programmatically
    TextChanged { document: DocumentId, text: String },
    /// A highlight pass replaced the document's annotations
    HighlightApplied {
        document: DocumentId,
        spans: Vec<HighlightSpan>,
    },
    /// A session took ownership of a document
    DocumentAttached(DocumentId),
    /// A session released a document; no further events follow for it
    DocumentDetached(DocumentId),
}

impl EditorEvent {
    /// The document this event is about.
    pub fn document(&self) -> DocumentId {
        match self {
            EditorEvent::TextChanged { document, .. }
            | EditorEvent::HighlightApplied { document, .. } => *document,
            EditorEvent::DocumentAttached(id) | EditorEvent::DocumentDetached(id) => *id,
        }
    }
}

/// Event bus for broadcasting editor events.
///
/// Lagged receivers drop old events rather than blocking the editor.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let id = DocumentId::new();

        bus.emit(EditorEvent::DocumentAttached(id));

        let event = rx.recv().await.unwrap();
        assert_eq!(event, EditorEvent::DocumentAttached(id));
        assert_eq!(event.document(), id);
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_a_copy() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let id = DocumentId::new();

        bus.emit(EditorEvent::DocumentDetached(id));
        drop(bus);

        assert_eq!(first.recv().await.unwrap(), EditorEvent::DocumentDetached(id));
        assert_eq!(second.recv().await.unwrap(), EditorEvent::DocumentDetached(id));
        assert!(first.recv().await.is_err());
    }
}
