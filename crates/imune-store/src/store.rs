//! Category store trait for the durable owner of record.

use async_trait::async_trait;

use imune_core::result::AppResult;
use imune_core::types::CategoryId;
use imune_entity::category::{Category, CategoryPatch, HierarchyUpdate, NewCategoryRecord};

/// Remote category table.
///
/// Authentication and row-level security are handled by the implementation
/// (or the backend itself); callers only see records.
#[async_trait]
pub trait CategoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "rest", "memory").
    fn provider_type(&self) -> &str;

    /// All categories as a flat list ordered by position.
    async fn list(&self) -> AppResult<Vec<Category>>;

    /// Insert a new category and return the stored row.
    async fn create(&self, record: &NewCategoryRecord) -> AppResult<Category>;

    /// Apply a partial update and return the stored row.
    async fn update(&self, id: &CategoryId, patch: &CategoryPatch) -> AppResult<Category>;

    /// Delete a category.
    async fn delete(&self, id: &CategoryId) -> AppResult<()>;

    /// Re-parent and re-position one category.
    ///
    /// The category leaves its current sibling group and is inserted at
    /// `position` in the target group; both groups are renumbered.
    async fn update_hierarchy(&self, update: &HierarchyUpdate) -> AppResult<()>;
}
