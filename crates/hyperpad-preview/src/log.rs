//! In-memory record of requests the server could not answer.

use std::sync::{Arc, Mutex};

/// Shared, append-only list of failure messages.
///
/// The host drains it to show what went wrong; tracing receives the same
/// messages as they happen.
#[derive(Debug, Clone, Default)]
pub struct PreviewLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl PreviewLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, message: impl Into<String>) {
        // a poisoned lock only means another writer panicked mid-push
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        entries.push(message.into());
    }

    /// Copies the current entries.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    /// Takes every entry, leaving the log empty.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(|err| err.into_inner()))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
