//! Hierarchy state container: optimistic moves reconciled with the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use imune_core::error::AppError;
use imune_core::result::AppResult;
use imune_core::traits::{NotificationKind, Notifier};
use imune_core::types::CategoryId;
use imune_entity::category::{CategoryTree, HierarchyUpdate};
use imune_store::CategoryStore;

use super::builder::build_tree;
use super::mutation::{apply_operation, promotion};
use super::operation::{MoveGesture, MoveOperation, classify_move};

/// Result of a structural move attempt.
#[derive(Debug, Clone)]
pub enum MoveOutcome {
    /// The gesture did not map to an operation; nothing was sent.
    Ignored,
    /// Another operation was still reconciling; nothing was touched.
    Busy,
    /// The backend accepted the move and the tree was reloaded.
    Committed(MoveOperation),
    /// The backend rejected the move; the optimistic edit was discarded.
    RolledBack {
        /// The operation that was attempted.
        op: MoveOperation,
        /// Why persistence failed.
        reason: AppError,
    },
}

impl MoveOutcome {
    /// Whether the backend accepted the move.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Owns the local category tree and serialises structural operations.
///
/// The tree is a disposable cache of the remote store: every move is applied
/// locally first, sent to the store, and then replaced by a fresh load
/// whether or not the store accepted it.
#[derive(Debug)]
pub struct HierarchyService {
    /// Durable owner of record.
    pub(super) store: Arc<dyn CategoryStore>,
    /// Toast sink.
    pub(super) notifier: Arc<dyn Notifier>,
    /// Current view.
    pub(super) tree: RwLock<CategoryTree>,
    /// Set while an operation is being persisted and reconciled.
    in_flight: AtomicBool,
    /// Last ticket handed out to a fetch or a local edit.
    tickets: AtomicU64,
    /// Ticket of the tree currently installed. Written under the tree lock.
    installed: AtomicU64,
}

/// Clears the in-flight flag when dropped.
pub(super) struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl HierarchyService {
    /// Create a service with an empty tree. Call [`load_hierarchy`] to
    /// populate it.
    ///
    /// [`load_hierarchy`]: Self::load_hierarchy
    pub fn new(store: Arc<dyn CategoryStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            tree: RwLock::new(CategoryTree::empty()),
            in_flight: AtomicBool::new(false),
            tickets: AtomicU64::new(0),
            installed: AtomicU64::new(0),
        }
    }

    /// A copy of the current tree.
    pub async fn tree(&self) -> CategoryTree {
        self.tree.read().await.clone()
    }

    /// Whether an operation is currently being reconciled.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Fetch the flat list and rebuild the tree.
    ///
    /// On failure the user is notified and the current tree is kept. A list
    /// fetched before a newer fetch or local edit landed is discarded.
    pub async fn load_hierarchy(&self) -> AppResult<CategoryTree> {
        match self.refresh().await {
            Ok(tree) => Ok(tree),
            Err(e) => {
                warn!(error = %e, "Failed to load category hierarchy");
                self.notifier
                    .notify(NotificationKind::Error, "Failed to load categories");
                Err(e)
            }
        }
    }

    /// Classify a gesture against the current tree without applying it.
    pub async fn classify_move(&self, gesture: &MoveGesture) -> Option<MoveOperation> {
        classify_move(&*self.tree.read().await, gesture)
    }

    /// Apply a drag-and-drop gesture optimistically and persist it.
    pub async fn apply_move(&self, gesture: &MoveGesture) -> MoveOutcome {
        let Some(_guard) = self.try_begin() else {
            debug!(active = %gesture.active_id, over = %gesture.over_id, "Move rejected, reconciliation pending");
            return MoveOutcome::Busy;
        };

        let op = classify_move(&*self.tree.read().await, gesture);
        match op {
            Some(op) => self.run_operation(op).await,
            None => {
                debug!(active = %gesture.active_id, over = %gesture.over_id, "Ignoring gesture");
                MoveOutcome::Ignored
            }
        }
    }

    /// Move a subcategory to the end of the root list.
    pub async fn promote_subcategory(&self, id: &CategoryId) -> MoveOutcome {
        let Some(_guard) = self.try_begin() else {
            return MoveOutcome::Busy;
        };

        let op = promotion(&*self.tree.read().await, id);
        match op {
            Some(op) => self.run_operation(op).await,
            None => {
                debug!(category_id = %id, "Nothing to promote");
                MoveOutcome::Ignored
            }
        }
    }

    /// Claim the single in-flight slot.
    pub(super) fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: &self.in_flight,
            })
    }

    /// Rebuild the tree from the store without notifying.
    async fn refresh(&self) -> AppResult<CategoryTree> {
        let ticket = self.next_ticket();
        let records = self.store.list().await?;
        let tree = build_tree(records);

        let mut current = self.tree.write().await;
        if ticket < self.installed.load(Ordering::Acquire) {
            debug!(ticket, "Discarding category list fetched before a newer change");
            return Ok(current.clone());
        }
        self.installed.store(ticket, Ordering::Release);
        *current = tree.clone();
        debug!(categories = tree.len(), roots = tree.roots.len(), "Category hierarchy loaded");
        Ok(tree)
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Mark a local edit as newer than every fetch already in progress.
    /// Caller holds the tree write lock.
    fn stamp_local_edit(&self) {
        self.installed.store(self.next_ticket(), Ordering::Release);
    }

    /// Edit locally, persist, and reconcile. Caller holds the guard.
    async fn run_operation(&self, op: MoveOperation) -> MoveOutcome {
        let (plan, snapshot) = {
            let mut tree = self.tree.write().await;
            let snapshot = tree.clone();
            match apply_operation(&mut tree, &op) {
                Ok(plan) => {
                    self.stamp_local_edit();
                    (plan, snapshot)
                }
                Err(e) => {
                    *tree = snapshot;
                    debug!(operation = op.kind(), error = %e, "Discarding inapplicable move");
                    return MoveOutcome::Ignored;
                }
            }
        };

        match self.persist(&plan).await {
            Ok(()) => {
                info!(
                    operation = op.kind(),
                    category_id = %op.category_id(),
                    updates = plan.len(),
                    "Category hierarchy updated"
                );
                self.notifier
                    .notify(NotificationKind::Success, op.success_message());
                if self.load_hierarchy().await.is_err() {
                    warn!(operation = op.kind(), "Reload after committed move failed, keeping local order");
                }
                MoveOutcome::Committed(op)
            }
            Err(reason) => {
                warn!(
                    operation = op.kind(),
                    category_id = %op.category_id(),
                    error = %reason,
                    "Failed to persist move, rolling back"
                );
                self.notifier
                    .notify(NotificationKind::Error, "Failed to update category hierarchy");
                if self.load_hierarchy().await.is_err() {
                    warn!(operation = op.kind(), "Reload after failed move failed, restoring previous tree");
                    let mut tree = self.tree.write().await;
                    self.stamp_local_edit();
                    *tree = snapshot;
                }
                MoveOutcome::RolledBack { op, reason }
            }
        }
    }

    async fn persist(&self, plan: &[HierarchyUpdate]) -> AppResult<()> {
        for update in plan {
            self.store.update_hierarchy(update).await?;
        }
        Ok(())
    }
}
