//! Store manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use imune_core::config::backend::{BackendConfig, BackendProvider};
use imune_core::error::AppError;
use imune_core::result::AppResult;
use imune_core::types::CategoryId;
use imune_entity::category::{Category, CategoryPatch, HierarchyUpdate, NewCategoryRecord};

use crate::store::CategoryStore;

/// Category store manager that wraps the configured provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct CategoryStoreManager {
    /// The inner store.
    inner: Arc<dyn CategoryStore>,
}

impl CategoryStoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &BackendConfig) -> AppResult<Self> {
        config.validate()?;

        let inner: Arc<dyn CategoryStore> = match config.provider {
            #[cfg(feature = "rest")]
            BackendProvider::Rest => {
                info!(url = %config.url, table = %config.table, "Initializing REST category store");
                Arc::new(crate::rest::RestCategoryStore::new(config)?)
            }
            #[cfg(feature = "memory")]
            BackendProvider::Memory => {
                info!("Initializing in-memory category store");
                let store = match &config.seed_file {
                    Some(path) => crate::memory::MemoryCategoryStore::from_seed_file(path).await?,
                    None => crate::memory::MemoryCategoryStore::new(),
                };
                Arc::new(store)
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(AppError::configuration(format!(
                    "Category store provider {other:?} is not compiled in"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing provider (for testing).
    pub fn from_store(store: Arc<dyn CategoryStore>) -> Self {
        Self { inner: store }
    }

    /// Get a reference to the inner store.
    pub fn store(&self) -> &dyn CategoryStore {
        self.inner.as_ref()
    }
}

#[async_trait]
impl CategoryStore for CategoryStoreManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn list(&self) -> AppResult<Vec<Category>> {
        self.inner.list().await
    }

    async fn create(&self, record: &NewCategoryRecord) -> AppResult<Category> {
        self.inner.create(record).await
    }

    async fn update(&self, id: &CategoryId, patch: &CategoryPatch) -> AppResult<Category> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &CategoryId) -> AppResult<()> {
        self.inner.delete(id).await
    }

    async fn update_hierarchy(&self, update: &HierarchyUpdate) -> AppResult<()> {
        self.inner.update_hierarchy(update).await
    }
}
