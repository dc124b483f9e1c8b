//! Notifier that forwards messages to the log.

use tracing::{error, info};

use imune_core::traits::{NotificationKind, Notifier};

/// Writes every notification as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => info!(notification = "success", "{message}"),
            NotificationKind::Error => error!(notification = "error", "{message}"),
        }
    }
}
