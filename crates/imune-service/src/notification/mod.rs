//! Notification sinks for structural and CRUD outcomes.

pub mod recording;
pub mod tracing_sink;

pub use recording::RecordingNotifier;
pub use tracing_sink::TracingNotifier;
