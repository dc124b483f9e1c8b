//! Category create/update/delete through the hierarchy engine.

use tracing::{info, warn};

use imune_core::error::AppError;
use imune_core::result::AppResult;
use imune_core::traits::NotificationKind;
use imune_core::types::CategoryId;
use imune_entity::category::{Category, CategoryPatch, NewCategory, NewCategoryRecord, NodeRef};

use super::service::HierarchyService;
use super::validation::{prepare_new, prepare_patch};

impl HierarchyService {
    /// Create a root category at the end of the root list.
    pub async fn create_category(&self, input: NewCategory) -> AppResult<Category> {
        let _guard = self.claim()?;
        let position = self.tree.read().await.roots.len();
        let record = build_record(input, None, position)?;
        self.write_and_reload(self.store.create(&record).await, "Category created")
            .await
            .inspect(|c| info!(category_id = %c.id, name = %c.name, "Category created"))
    }

    /// Create a subcategory at the end of `parent_id`'s children.
    pub async fn create_subcategory(
        &self,
        parent_id: &CategoryId,
        input: NewCategory,
    ) -> AppResult<Category> {
        let _guard = self.claim()?;
        let position = {
            let tree = self.tree.read().await;
            match tree.locate(parent_id.as_str()) {
                Some(NodeRef::Root { index }) => tree.roots[index].children.len(),
                Some(NodeRef::Child { .. }) => {
                    return Err(AppError::validation(
                        "Subcategories cannot have subcategories",
                    ));
                }
                None => {
                    return Err(AppError::not_found(format!(
                        "Parent category '{parent_id}' not found"
                    )));
                }
            }
        };
        let record = build_record(input, Some(parent_id.clone()), position)?;
        self.write_and_reload(self.store.create(&record).await, "Subcategory created")
            .await
            .inspect(|c| {
                info!(category_id = %c.id, parent_id = %parent_id, name = %c.name, "Subcategory created")
            })
    }

    /// Edit name, description, color, or visibility.
    pub async fn update_category(
        &self,
        id: &CategoryId,
        patch: CategoryPatch,
    ) -> AppResult<Category> {
        let _guard = self.claim()?;
        self.ensure_known(id).await?;
        let patch = prepare_patch(&patch)?;
        self.write_and_reload(self.store.update(id, &patch).await, "Category updated")
            .await
            .inspect(|c| info!(category_id = %c.id, "Category updated"))
    }

    /// Delete a category. Root categories must be emptied first.
    pub async fn delete_category(&self, id: &CategoryId) -> AppResult<()> {
        let _guard = self.claim()?;
        self.ensure_known(id).await?;
        if let Some(root) = self.tree.read().await.root(id.as_str()) {
            if !root.children.is_empty() {
                return Err(AppError::conflict(format!(
                    "Category '{}' still has {} subcategories",
                    root.category.name,
                    root.children.len()
                )));
            }
        }
        self.write_and_reload(self.store.delete(id).await, "Category deleted")
            .await
            .inspect(|_| info!(category_id = %id, "Category deleted"))
    }

    fn claim(&self) -> AppResult<super::service::InFlightGuard<'_>> {
        self.try_begin()
            .ok_or_else(|| AppError::conflict("Another category change is still being saved"))
    }

    async fn ensure_known(&self, id: &CategoryId) -> AppResult<()> {
        if self.tree.read().await.get(id.as_str()).is_none() {
            return Err(AppError::not_found(format!("Category '{id}' not found")));
        }
        Ok(())
    }

    /// Notify the outcome of a store write and reload after a success.
    async fn write_and_reload<T>(&self, result: AppResult<T>, success: &str) -> AppResult<T> {
        match result {
            Ok(value) => {
                self.notifier.notify(NotificationKind::Success, success);
                if self.load_hierarchy().await.is_err() {
                    warn!("Reload after category write failed");
                }
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "Category write failed");
                self.notifier
                    .notify(NotificationKind::Error, &format!("Failed to save category: {}", e.message));
                Err(e)
            }
        }
    }
}

fn build_record(
    input: NewCategory,
    parent_id: Option<CategoryId>,
    position: usize,
) -> AppResult<NewCategoryRecord> {
    let input = prepare_new(input)?;
    Ok(NewCategoryRecord {
        name: input.name,
        description: input.description,
        color: input.color,
        parent_id,
        position: position as i32,
        is_active: true,
        owner_id: input.owner_id,
    })
}
