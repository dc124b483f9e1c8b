//! # imune-entity
//!
//! Domain entity models for the IMUNE+ admin backend. `Category` mirrors a
//! row of the remote categories table; the tree module holds the two-level
//! view the hierarchy engine edits.

pub mod category;
