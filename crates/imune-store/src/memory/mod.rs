//! In-process category store.

pub mod store;

pub use store::MemoryCategoryStore;
