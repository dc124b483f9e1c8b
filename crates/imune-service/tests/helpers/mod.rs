//! Shared fixtures for hierarchy engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;

use imune_core::types::{CategoryId, UserId};
use imune_entity::category::{Category, CategoryTree, NewCategory};
use imune_service::HierarchyService;
use imune_service::hierarchy::build_tree;
use imune_service::notification::RecordingNotifier;
use imune_store::CategoryStore;
use imune_store::memory::MemoryCategoryStore;

/// Engine wired to an in-memory store and a recording notifier.
pub struct TestHierarchy {
    pub store: Arc<MemoryCategoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub service: Arc<HierarchyService>,
}

impl TestHierarchy {
    /// Seed the store with two roots:
    /// `x: [a, b, c]` and `y: [d, e]`, plus an empty root `z`.
    pub async fn new() -> Self {
        Self::with_records(vec![
            row("x", None, 0),
            row("y", None, 1),
            row("z", None, 2),
            row("a", Some("x"), 0),
            row("b", Some("x"), 1),
            row("c", Some("x"), 2),
            row("d", Some("y"), 0),
            row("e", Some("y"), 1),
        ])
        .await
    }

    /// Seed the store with arbitrary rows and perform the initial load.
    pub async fn with_records(records: Vec<Category>) -> Self {
        let store = Arc::new(MemoryCategoryStore::with_records(records));
        let notifier = Arc::new(RecordingNotifier::new());
        let service = Arc::new(HierarchyService::new(store.clone(), notifier.clone()));
        service
            .load_hierarchy()
            .await
            .expect("initial load should succeed");
        Self {
            store,
            notifier,
            service,
        }
    }

    /// A tree built straight from the store, bypassing the engine.
    pub async fn fresh_tree(&self) -> CategoryTree {
        build_tree(self.store.list().await.expect("list"))
    }

    /// Child ids of a root in the engine's current tree.
    pub async fn children_of(&self, id: &str) -> Vec<String> {
        self.service
            .tree()
            .await
            .root(id)
            .map(|r| r.children.iter().map(|c| c.id().to_string()).collect())
            .unwrap_or_default()
    }

    /// Root ids in the engine's current tree.
    pub async fn root_ids(&self) -> Vec<String> {
        self.service
            .tree()
            .await
            .roots
            .iter()
            .map(|r| r.id().to_string())
            .collect()
    }
}

/// A category row with fixed cosmetic fields.
pub fn row(id: &str, parent: Option<&str>, position: i32) -> Category {
    let now = Utc::now();
    Category {
        id: CategoryId::new(id),
        name: format!("Categoria {id}"),
        description: None,
        color: "#16a34a".to_string(),
        parent_id: parent.map(CategoryId::new),
        position,
        file_count: 0,
        is_active: true,
        owner_id: UserId::new("admin"),
        created_at: now,
        updated_at: now,
    }
}

/// Creation input with a valid color.
pub fn new_category(name: &str) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        description: Some("Material de treinamento".to_string()),
        color: "#2563EB".to_string(),
        owner_id: UserId::new("admin"),
    }
}

/// Assert that every category appears exactly once and children agree with
/// their parent.
pub fn assert_well_formed(tree: &CategoryTree, expected_len: usize) {
    let mut ids: Vec<&str> = tree.categories().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), expected_len, "category count changed");
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), expected_len, "a category appears twice");

    for root in &tree.roots {
        assert!(root.category.parent_id.is_none());
        for child in &root.children {
            assert_eq!(child.parent_id(), root.id());
            assert_eq!(child.category.parent_id.as_ref(), Some(root.id()));
        }
    }
}
