//! # imune-core
//!
//! Core crate for the IMUNE+ admin backend. Contains the unified error
//! system, typed identifiers, configuration schemas, and the notification
//! trait shared by the hierarchy engine and its front-ends.
//!
//! This crate has **no** internal dependencies on other IMUNE+ crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
