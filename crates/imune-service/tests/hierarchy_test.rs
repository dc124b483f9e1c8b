//! Integration tests for structural moves and reconciliation.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use imune_core::error::AppError;
use imune_core::result::AppResult;
use imune_core::traits::NotificationKind;
use imune_core::types::CategoryId;
use imune_entity::category::{
    Category, CategoryPatch, CategoryTree, HierarchyUpdate, NewCategoryRecord,
};
use imune_service::hierarchy::build_tree;
use imune_service::hierarchy::mutation::apply_operation;
use imune_service::notification::RecordingNotifier;
use imune_service::{HierarchyService, MoveGesture, MoveOperation, MoveOutcome};
use imune_store::CategoryStore;
use imune_store::memory::MemoryCategoryStore;

use helpers::{TestHierarchy, assert_well_formed, row};

#[tokio::test]
async fn test_child_onto_other_parent_is_appended_last() {
    let h = TestHierarchy::new().await;

    let outcome = h.service.apply_move(&MoveGesture::new("a", "y")).await;

    assert!(matches!(
        outcome,
        MoveOutcome::Committed(MoveOperation::ReparentChild { .. })
    ));
    assert_eq!(h.children_of("x").await, vec!["b", "c"]);
    assert_eq!(h.children_of("y").await, vec!["d", "e", "a"]);
}

#[tokio::test]
async fn test_parent_onto_parent_demotes_and_flattens() {
    let h = TestHierarchy::new().await;

    let outcome = h.service.apply_move(&MoveGesture::new("x", "y")).await;

    assert!(outcome.is_committed());
    assert_eq!(h.root_ids().await, vec!["y", "z"]);
    assert_eq!(h.children_of("y").await, vec!["d", "e", "x", "a", "b", "c"]);

    let tree = h.service.tree().await;
    for id in ["x", "a", "b", "c"] {
        assert_eq!(
            tree.get(id).unwrap().parent_id.as_ref().map(|p| p.as_str()),
            Some("y")
        );
    }
    assert_well_formed(&tree, 8);
}

#[tokio::test]
async fn test_sibling_reorder_moves_to_target_index() {
    let h = TestHierarchy::new().await;

    let outcome = h.service.apply_move(&MoveGesture::new("a", "c")).await;

    assert!(matches!(
        outcome,
        MoveOutcome::Committed(MoveOperation::ReorderSiblings { .. })
    ));
    assert_eq!(h.children_of("x").await, vec!["b", "c", "a"]);
}

#[tokio::test]
async fn test_child_onto_foreign_child_lands_after_it() {
    let h = TestHierarchy::new().await;

    let outcome = h.service.apply_move(&MoveGesture::new("b", "d")).await;

    assert!(matches!(
        outcome,
        MoveOutcome::Committed(MoveOperation::TransferChild { .. })
    ));
    assert_eq!(h.children_of("x").await, vec!["a", "c"]);
    assert_eq!(h.children_of("y").await, vec!["d", "b", "e"]);
}

#[tokio::test]
async fn test_promote_subcategory() {
    let h = TestHierarchy::new().await;

    let outcome = h
        .service
        .promote_subcategory(&"e".parse().unwrap())
        .await;

    assert!(outcome.is_committed());
    assert_eq!(h.root_ids().await, vec!["x", "y", "z", "e"]);
    assert_eq!(h.children_of("y").await, vec!["d"]);

    let again = h.service.promote_subcategory(&"e".parse().unwrap()).await;
    assert!(matches!(again, MoveOutcome::Ignored));
}

#[tokio::test]
async fn test_failed_persist_discards_optimistic_edit() {
    let h = TestHierarchy::new().await;
    let before = h.service.tree().await.outline();

    h.store.fail_next_writes(1);
    let outcome = h.service.apply_move(&MoveGesture::new("x", "y")).await;

    match outcome {
        MoveOutcome::RolledBack { op, reason } => {
            assert_eq!(op.kind(), "demote_parent");
            assert!(reason.is_retryable());
        }
        other => panic!("expected rollback, got {other:?}"),
    }
    let after = h.service.tree().await;
    assert_eq!(after.outline(), before);
    assert_eq!(after.outline(), h.fresh_tree().await.outline());
    assert_eq!(
        h.notifier.messages(NotificationKind::Error),
        vec!["Failed to update category hierarchy"]
    );
}

/// Delegates to a memory store but fails the n-th hierarchy update.
#[derive(Debug)]
struct FailNthHierarchyUpdate {
    inner: Arc<MemoryCategoryStore>,
    fail_on: usize,
    seen: AtomicUsize,
}

#[async_trait]
impl CategoryStore for FailNthHierarchyUpdate {
    fn provider_type(&self) -> &str {
        "flaky"
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
        if self.seen.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(AppError::external_service("connection reset"));
        }
        self.inner.update_hierarchy(update).await
    }
}

#[tokio::test]
async fn test_partial_persist_reconciles_to_remote_truth() {
    let inner = Arc::new(MemoryCategoryStore::with_records(vec![
        row("x", None, 0),
        row("y", None, 1),
        row("a", Some("x"), 0),
        row("b", Some("x"), 1),
    ]));
    let store = Arc::new(FailNthHierarchyUpdate {
        inner: inner.clone(),
        fail_on: 2,
        seen: AtomicUsize::new(0),
    });
    let service = HierarchyService::new(store, Arc::new(RecordingNotifier::new()));
    service.load_hierarchy().await.unwrap();

    // `x` is placed under `y`, then re-parenting its first child fails.
    let outcome = service.apply_move(&MoveGesture::new("x", "y")).await;
    assert!(matches!(outcome, MoveOutcome::RolledBack { .. }));

    let tree = service.tree().await;
    assert_eq!(
        tree.outline(),
        build_tree(inner.list().await.unwrap()).outline()
    );
    assert_well_formed(&tree, 4);
    // The remote now nests `a` and `b` under a subcategory; the view
    // attaches them to the surviving root.
    let y = tree.root("y").unwrap();
    let ids: Vec<&str> = y.children.iter().map(|c| c.id().as_str()).collect();
    assert_eq!(ids, vec!["x", "a", "b"]);
}

#[tokio::test]
async fn test_every_attempt_refetches_exactly_once() {
    let h = TestHierarchy::new().await;
    assert_eq!(h.store.list_calls(), 1);

    h.service.apply_move(&MoveGesture::new("a", "b")).await;
    assert_eq!(h.store.list_calls(), 2);

    h.store.fail_next_writes(1);
    h.service.apply_move(&MoveGesture::new("a", "b")).await;
    assert_eq!(h.store.list_calls(), 3);

    h.service.apply_move(&MoveGesture::new("a", "a")).await;
    h.service.apply_move(&MoveGesture::new("a", "ghost")).await;
    assert_eq!(h.store.list_calls(), 3);
}

#[tokio::test]
async fn test_committed_moves_match_optimistic_tree() {
    let h = TestHierarchy::new().await;
    let gestures = [
        ("a", "c"),
        ("d", "b"),
        ("e", "x"),
        ("y", "z"),
        ("c", "a"),
        ("x", "z"),
    ];

    for (active, over) in gestures {
        let gesture = MoveGesture::new(active, over);
        let mut expected: CategoryTree = h.service.tree().await;
        let op = h
            .service
            .classify_move(&gesture)
            .await
            .unwrap_or_else(|| panic!("{active} -> {over} should classify"));
        apply_operation(&mut expected, &op).unwrap();

        let outcome = h.service.apply_move(&gesture).await;
        assert!(outcome.is_committed(), "{active} -> {over}: {outcome:?}");
        assert_eq!(
            h.service.tree().await.outline(),
            expected.outline(),
            "{active} -> {over}"
        );
    }

    assert_eq!(h.root_ids().await, vec!["z"]);
    assert_well_formed(&h.service.tree().await, 8);
}

#[tokio::test]
async fn test_exhaustive_gestures_keep_tree_well_formed() {
    let h = TestHierarchy::new().await;
    let ids = ["x", "y", "z", "a", "b", "c", "d", "e"];

    for (step, active) in ids.iter().enumerate() {
        for over in ids.iter().rev().skip(step % 3) {
            if step % 4 == 3 {
                h.store.fail_next_writes(1);
            }
            h.service.apply_move(&MoveGesture::new(*active, *over)).await;
            let tree = h.service.tree().await;
            assert_well_formed(&tree, ids.len());
            assert_eq!(tree.outline(), h.fresh_tree().await.outline());
        }
        // Keep a second root around so parent gestures stay meaningful.
        if h.service.tree().await.roots.len() == 1 {
            let child = h.service.tree().await.roots[0].children[0].id().clone();
            h.service.promote_subcategory(&child).await;
        }
    }
}

#[tokio::test]
async fn test_second_gesture_during_reconciliation_is_rejected() {
    let h = TestHierarchy::new().await;
    h.store.set_write_delay(Duration::from_millis(200));

    let service = h.service.clone();
    let first = tokio::spawn(async move { service.apply_move(&MoveGesture::new("a", "y")).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.service.is_busy());
    let second = h.service.apply_move(&MoveGesture::new("d", "x")).await;
    assert!(matches!(second, MoveOutcome::Busy));

    let first = first.await.unwrap();
    assert!(first.is_committed());
    assert!(!h.service.is_busy());
    assert_eq!(h.store.hierarchy_calls(), 1);
    assert_eq!(h.children_of("y").await, vec!["d", "e", "a"]);
    assert_well_formed(&h.service.tree().await, 8);
}

#[tokio::test]
async fn test_success_notification_names_the_operation() {
    let h = TestHierarchy::new().await;
    h.service.apply_move(&MoveGesture::new("a", "c")).await;
    assert_eq!(
        h.notifier.messages(NotificationKind::Success),
        vec!["Subcategories reordered"]
    );
}

#[tokio::test]
async fn test_reload_failure_after_commit_is_reported() {
    let h = TestHierarchy::new().await;
    h.store.set_fail_reads(true);

    let outcome = h.service.apply_move(&MoveGesture::new("a", "y")).await;

    assert!(outcome.is_committed());
    assert_eq!(
        h.notifier.messages(NotificationKind::Success),
        vec!["Subcategory moved to another category"]
    );
    assert_eq!(
        h.notifier.messages(NotificationKind::Error),
        vec!["Failed to load categories"]
    );
    assert_eq!(h.children_of("y").await, vec!["d", "e", "a"]);
    assert!(!h.service.is_busy());
}

#[tokio::test]
async fn test_slow_reload_does_not_overwrite_later_move() {
    let h = TestHierarchy::new().await;
    h.store.set_read_delay(Duration::from_millis(200));

    let service = h.service.clone();
    let slow = tokio::spawn(async move { service.load_hierarchy().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    h.store.set_read_delay(Duration::ZERO);

    let outcome = h.service.apply_move(&MoveGesture::new("a", "y")).await;
    assert!(outcome.is_committed());
    slow.await.unwrap().unwrap();

    assert_eq!(h.store.list_calls(), 3);
    assert_eq!(
        h.service.tree().await.outline(),
        h.fresh_tree().await.outline()
    );
    assert_eq!(h.children_of("x").await, vec!["b", "c"]);
    assert_eq!(h.children_of("y").await, vec!["d", "e", "a"]);
}
