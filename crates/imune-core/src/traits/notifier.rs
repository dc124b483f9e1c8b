//! User-facing notification sink (toasts in the admin dashboard).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The operation completed.
    Success,
    /// The operation failed and was rolled back.
    Error,
}

/// A single delivered notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Message shown to the user.
    pub message: String,
    /// When the notification was raised.
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    /// Build a notification stamped with the current time.
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}

/// Fire-and-forget sink for user-facing messages.
///
/// Implementations must not block; nothing is returned to the caller.
pub trait Notifier: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver a message to the user.
    fn notify(&self, kind: NotificationKind, message: &str);
}
