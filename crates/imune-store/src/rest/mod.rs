//! PostgREST-compatible backend-as-a-service category store.

pub mod client;

pub use client::RestCategoryStore;
