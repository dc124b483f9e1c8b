//! # imune-service
//!
//! The category hierarchy engine behind the admin "Categorias" page.
//! [`HierarchyService`] owns the local two-level tree, turns drag-and-drop
//! gestures into structural operations, applies them optimistically, and
//! reconciles with the remote category store after every attempt.

pub mod hierarchy;
pub mod notification;

pub use hierarchy::{HierarchyService, MoveGesture, MoveOperation, MoveOutcome};
