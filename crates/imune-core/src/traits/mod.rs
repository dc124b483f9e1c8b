//! Core traits defined in `imune-core` and implemented by other crates.

pub mod notifier;

pub use notifier::{Notification, NotificationKind, Notifier};
