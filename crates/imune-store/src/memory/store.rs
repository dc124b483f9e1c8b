//! In-memory category table with backend-equivalent ordering semantics.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use imune_core::error::AppError;
use imune_core::result::AppResult;
use imune_core::types::CategoryId;
use imune_entity::category::{Category, CategoryPatch, HierarchyUpdate, NewCategoryRecord};

use crate::store::CategoryStore;

/// In-process category store.
///
/// Mirrors the positional behaviour of the remote hierarchy procedure so that
/// reconciled trees match what the backend would return. Failure injection
/// and call counters make it usable as a test double.
#[derive(Debug, Default)]
pub struct MemoryCategoryStore {
    /// Rows in insertion order.
    records: RwLock<Vec<Category>>,
    /// Number of upcoming writes that fail.
    failing_writes: AtomicUsize,
    /// Whether `list` fails.
    fail_reads: AtomicBool,
    /// Artificial latency applied to every write, in milliseconds.
    write_delay_ms: AtomicU64,
    /// Latency between reading the rows and returning them, in milliseconds.
    read_delay_ms: AtomicU64,
    /// Number of `list` calls served.
    list_calls: AtomicUsize,
    /// Number of `update_hierarchy` calls received.
    hierarchy_calls: AtomicUsize,
}

impl MemoryCategoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with rows.
    pub fn with_records(records: Vec<Category>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    /// Create a store from a JSON array of category rows.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::configuration(format!(
                "Failed to read seed file '{}': {e}",
                path.display()
            ))
        })?;
        let records: Vec<Category> = serde_json::from_str(&raw)?;
        debug!(count = records.len(), path = %path.display(), "Seeded memory category store");
        Ok(Self::with_records(records))
    }

    /// Make the next `count` writes fail with an external-service error.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Make every `list` call fail until switched off.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Delay every write by `delay`.
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Delay every `list` response by `delay`. Rows are read before the
    /// delay, so a slow response can be older than later writes.
    pub fn set_read_delay(&self, delay: Duration) {
        self.read_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `list` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `update_hierarchy` calls received so far.
    pub fn hierarchy_calls(&self) -> usize {
        self.hierarchy_calls.load(Ordering::SeqCst)
    }

    /// Rows ordered by position.
    pub async fn snapshot(&self) -> Vec<Category> {
        sorted(&self.records.read().await)
    }

    async fn before_write(&self) -> AppResult<()> {
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let injected = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(AppError::external_service("Injected write failure"));
        }
        Ok(())
    }
}

/// Clone rows ordered by position; equal positions keep insertion order.
fn sorted(records: &[Category]) -> Vec<Category> {
    let mut out = records.to_vec();
    out.sort_by_key(|c| c.position);
    out
}

/// Indices of the rows under `parent`, ordered by position, skipping `exclude`.
fn group(records: &[Category], parent: &Option<CategoryId>, exclude: Option<usize>) -> Vec<usize> {
    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(i, c)| Some(*i) != exclude && &c.parent_id == parent)
        .map(|(i, _)| i)
        .collect();
    indices.sort_by_key(|&i| records[i].position);
    indices
}

fn renumber(records: &mut [Category], indices: &[usize]) {
    for (position, &i) in indices.iter().enumerate() {
        records[i].position = position as i32;
    }
}

/// Insert row `idx` at `position` in the group of `parent` and renumber.
fn place(records: &mut [Category], idx: usize, parent: &Option<CategoryId>, position: i32) {
    let mut siblings = group(records, parent, Some(idx));
    let at = (position.max(0) as usize).min(siblings.len());
    siblings.insert(at, idx);
    records[idx].parent_id = parent.clone();
    renumber(records, &siblings);
}

fn ensure_parent(records: &[Category], parent: &Option<CategoryId>) -> AppResult<()> {
    if let Some(parent_id) = parent {
        if !records.iter().any(|c| &c.id == parent_id) {
            return Err(AppError::not_found(format!(
                "Parent category '{parent_id}' not found"
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn list(&self) -> AppResult<Vec<Category>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::service_unavailable("Injected read failure"));
        }
        let rows = sorted(&self.records.read().await);

        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(rows)
    }

    async fn create(&self, record: &NewCategoryRecord) -> AppResult<Category> {
        self.before_write().await?;
        let mut records = self.records.write().await;
        ensure_parent(&records, &record.parent_id)?;

        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(uuid::Uuid::new_v4().to_string()),
            name: record.name.clone(),
            description: record.description.clone(),
            color: record.color.clone(),
            parent_id: record.parent_id.clone(),
            position: record.position,
            file_count: 0,
            is_active: record.is_active,
            owner_id: record.owner_id.clone(),
            created_at: now,
            updated_at: now,
        };
        records.push(category);
        let idx = records.len() - 1;
        place(&mut records, idx, &record.parent_id, record.position);

        Ok(records[idx].clone())
    }

    async fn update(&self, id: &CategoryId, patch: &CategoryPatch) -> AppResult<Category> {
        self.before_write().await?;
        let mut records = self.records.write().await;
        let category = records
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| AppError::not_found(format!("Category '{id}' not found")))?;

        patch.apply_to(category);
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&self, id: &CategoryId) -> AppResult<()> {
        self.before_write().await?;
        let mut records = self.records.write().await;
        let idx = records
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| AppError::not_found(format!("Category '{id}' not found")))?;

        let removed = records.remove(idx);
        let siblings = group(&records, &removed.parent_id, None);
        renumber(&mut records, &siblings);
        Ok(())
    }

    async fn update_hierarchy(&self, update: &HierarchyUpdate) -> AppResult<()> {
        self.hierarchy_calls.fetch_add(1, Ordering::SeqCst);
        self.before_write().await?;
        let mut records = self.records.write().await;

        let idx = records
            .iter()
            .position(|c| c.id == update.category_id)
            .ok_or_else(|| {
                AppError::not_found(format!("Category '{}' not found", update.category_id))
            })?;
        if update.parent_id.as_ref() == Some(&update.category_id) {
            return Err(AppError::validation("A category cannot be its own parent"));
        }
        ensure_parent(&records, &update.parent_id)?;

        let old_parent = records[idx].parent_id.clone();
        let old_siblings = group(&records, &old_parent, Some(idx));
        renumber(&mut records, &old_siblings);
        place(&mut records, idx, &update.parent_id, update.position);
        records[idx].updated_at = Utc::now();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imune_core::types::UserId;

    fn row(id: &str, parent: Option<&str>, position: i32) -> Category {
        let now = Utc::now();
        Category {
            id: CategoryId::new(id),
            name: id.to_string(),
            description: None,
            color: "#000000".to_string(),
            parent_id: parent.map(CategoryId::new),
            position,
            file_count: 0,
            is_active: true,
            owner_id: UserId::new("admin"),
            created_at: now,
            updated_at: now,
        }
    }

    fn ids_under(rows: &[Category], parent: Option<&str>) -> Vec<String> {
        rows.iter()
            .filter(|c| c.parent_id.as_ref().map(|p| p.as_str()) == parent)
            .map(|c| c.id.to_string())
            .collect()
    }

    fn store() -> MemoryCategoryStore {
        MemoryCategoryStore::with_records(vec![
            row("x", None, 0),
            row("y", None, 1),
            row("a", Some("x"), 0),
            row("b", Some("x"), 1),
            row("c", Some("x"), 2),
            row("d", Some("y"), 0),
        ])
    }

    #[tokio::test]
    async fn test_update_hierarchy_reorders_within_group() {
        let store = store();
        store
            .update_hierarchy(&HierarchyUpdate {
                category_id: CategoryId::new("a"),
                parent_id: Some(CategoryId::new("x")),
                position: 2,
            })
            .await
            .unwrap();
        let rows = store.list().await.unwrap();
        assert_eq!(ids_under(&rows, Some("x")), vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_update_hierarchy_moves_between_groups() {
        let store = store();
        store
            .update_hierarchy(&HierarchyUpdate {
                category_id: CategoryId::new("b"),
                parent_id: Some(CategoryId::new("y")),
                position: 1,
            })
            .await
            .unwrap();
        let rows = store.list().await.unwrap();
        assert_eq!(ids_under(&rows, Some("x")), vec!["a", "c"]);
        assert_eq!(ids_under(&rows, Some("y")), vec!["d", "b"]);
    }

    #[tokio::test]
    async fn test_update_hierarchy_rejects_self_parent() {
        let store = store();
        let err = store
            .update_hierarchy(&HierarchyUpdate {
                category_id: CategoryId::new("x"),
                parent_id: Some(CategoryId::new("x")),
                position: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, imune_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_injected_write_failure_is_consumed() {
        let store = store();
        store.fail_next_writes(1);
        let update = HierarchyUpdate {
            category_id: CategoryId::new("d"),
            parent_id: None,
            position: 5,
        };
        assert!(store.update_hierarchy(&update).await.is_err());
        assert!(store.update_hierarchy(&update).await.is_ok());
        assert_eq!(store.hierarchy_calls(), 2);

        let rows = store.list().await.unwrap();
        assert_eq!(ids_under(&rows, None), vec!["x", "y", "d"]);
    }

    #[tokio::test]
    async fn test_create_and_delete_renumber_siblings() {
        let store = store();
        let created = store
            .create(&NewCategoryRecord {
                name: "Novo".to_string(),
                description: None,
                color: "#ffffff".to_string(),
                parent_id: Some(CategoryId::new("x")),
                position: 3,
                is_active: true,
                owner_id: UserId::new("admin"),
            })
            .await
            .unwrap();
        assert_eq!(created.position, 3);

        store.delete(&CategoryId::new("a")).await.unwrap();
        let rows = store.list().await.unwrap();
        let under_x: Vec<i32> = rows
            .iter()
            .filter(|c| c.parent_id == Some(CategoryId::new("x")))
            .map(|c| c.position)
            .collect();
        assert_eq!(under_x, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_read_failure() {
        let store = store();
        store.set_fail_reads(true);
        assert!(store.list().await.is_err());
        assert_eq!(store.list_calls(), 1);
    }
}
