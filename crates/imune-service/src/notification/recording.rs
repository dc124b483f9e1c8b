//! Notifier that keeps every message for later inspection.

use parking_lot::Mutex;

use imune_core::traits::{Notification, NotificationKind, Notifier};

/// Collects notifications in memory. Used by the CLI to print outcomes and
/// by tests to assert on them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().clone()
    }

    /// Messages of a given kind, oldest first.
    pub fn messages(&self, kind: NotificationKind) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.message.clone())
            .collect()
    }

    /// Remove and return everything received so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.received.lock().push(Notification::new(kind, message));
    }
}
