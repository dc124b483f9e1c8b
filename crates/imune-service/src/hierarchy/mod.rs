//! Category hierarchy engine.

pub mod builder;
pub mod crud;
pub mod mutation;
pub mod operation;
pub mod service;
pub mod validation;

pub use builder::build_tree;
pub use operation::{MoveGesture, MoveOperation, classify_move};
pub use service::{HierarchyService, MoveOutcome};
