//! # imune-store
//!
//! Remote category store implementations for IMUNE+. Supports two modes:
//!
//! - **rest**: a PostgREST-compatible backend-as-a-service reached with
//!   [reqwest](https://crates.io/crates/reqwest)
//! - **memory**: an in-process table, used offline and in tests
//!
//! The provider is selected at runtime based on configuration.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "rest")]
pub mod rest;
pub mod store;

pub use provider::CategoryStoreManager;
pub use store::CategoryStore;
