//! Core type definitions used across the IMUNE+ workspace.

pub mod id;

pub use id::*;
