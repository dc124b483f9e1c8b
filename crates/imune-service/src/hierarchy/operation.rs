//! Move gestures and their classification into structural operations.

use serde::{Deserialize, Serialize};

use imune_core::types::CategoryId;
use imune_entity::category::{CategoryTree, NodeRef};

/// A completed drag-and-drop interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveGesture {
    /// The dragged category.
    pub active_id: CategoryId,
    /// The category it was dropped on.
    pub over_id: CategoryId,
}

impl MoveGesture {
    /// Build a gesture from the dragged and target ids.
    pub fn new(active_id: impl Into<CategoryId>, over_id: impl Into<CategoryId>) -> Self {
        Self {
            active_id: active_id.into(),
            over_id: over_id.into(),
        }
    }
}

/// A structural edit of the two-level tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum MoveOperation {
    /// A subcategory dropped on a root category: appended to its children.
    ReparentChild {
        /// Moved subcategory.
        category_id: CategoryId,
        /// Previous owner.
        from_parent: CategoryId,
        /// New owner.
        to_parent: CategoryId,
    },
    /// A root category dropped on another root: it becomes a subcategory and
    /// its own children are flattened after it.
    DemoteParent {
        /// Demoted category.
        category_id: CategoryId,
        /// New owner.
        new_parent: CategoryId,
        /// Former children, in order, that move along.
        carried: Vec<CategoryId>,
    },
    /// A subcategory dropped on a sibling: array move within the parent.
    ReorderSiblings {
        /// Shared parent.
        parent_id: CategoryId,
        /// Moved subcategory.
        category_id: CategoryId,
        /// Index before the move.
        from_index: usize,
        /// Index after the move (the target's former index).
        to_index: usize,
    },
    /// A subcategory dropped on a subcategory of another parent: inserted
    /// right after the target.
    TransferChild {
        /// Moved subcategory.
        category_id: CategoryId,
        /// Previous owner.
        from_parent: CategoryId,
        /// New owner.
        to_parent: CategoryId,
        /// The subcategory it lands after.
        after: CategoryId,
    },
    /// A subcategory moved to the end of the root list.
    PromoteChild {
        /// Promoted subcategory.
        category_id: CategoryId,
        /// Previous owner.
        from_parent: CategoryId,
    },
}

impl MoveOperation {
    /// The category whose placement changes.
    pub fn category_id(&self) -> &CategoryId {
        match self {
            Self::ReparentChild { category_id, .. }
            | Self::DemoteParent { category_id, .. }
            | Self::ReorderSiblings { category_id, .. }
            | Self::TransferChild { category_id, .. }
            | Self::PromoteChild { category_id, .. } => category_id,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReparentChild { .. } => "reparent_child",
            Self::DemoteParent { .. } => "demote_parent",
            Self::ReorderSiblings { .. } => "reorder_siblings",
            Self::TransferChild { .. } => "transfer_child",
            Self::PromoteChild { .. } => "promote_child",
        }
    }

    /// Message shown after the backend accepted the move.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::ReparentChild { .. } => "Subcategory moved to another category",
            Self::DemoteParent { .. } => "Category turned into a subcategory",
            Self::ReorderSiblings { .. } => "Subcategories reordered",
            Self::TransferChild { .. } => "Subcategory moved",
            Self::PromoteChild { .. } => "Subcategory promoted to category",
        }
    }
}

/// Resolve a gesture against the current tree.
///
/// Returns `None` for self-drops, unknown ids, and a root category dropped
/// on a subcategory.
pub fn classify_move(tree: &CategoryTree, gesture: &MoveGesture) -> Option<MoveOperation> {
    if gesture.active_id == gesture.over_id {
        return None;
    }

    let active = tree.locate(gesture.active_id.as_str())?;
    let over = tree.locate(gesture.over_id.as_str())?;

    match (active, over) {
        (NodeRef::Child { parent_id, .. }, NodeRef::Root { index }) => {
            Some(MoveOperation::ReparentChild {
                category_id: gesture.active_id.clone(),
                from_parent: parent_id,
                to_parent: tree.roots[index].id().clone(),
            })
        }
        (NodeRef::Root { index }, NodeRef::Root { index: over_index }) => {
            Some(MoveOperation::DemoteParent {
                category_id: gesture.active_id.clone(),
                new_parent: tree.roots[over_index].id().clone(),
                carried: tree.roots[index]
                    .children
                    .iter()
                    .map(|c| c.id().clone())
                    .collect(),
            })
        }
        (
            NodeRef::Child {
                parent_id: active_parent,
                index: from_index,
                ..
            },
            NodeRef::Child {
                parent_id: over_parent,
                index: to_index,
                ..
            },
        ) => {
            if active_parent == over_parent {
                Some(MoveOperation::ReorderSiblings {
                    parent_id: active_parent,
                    category_id: gesture.active_id.clone(),
                    from_index,
                    to_index,
                })
            } else {
                Some(MoveOperation::TransferChild {
                    category_id: gesture.active_id.clone(),
                    from_parent: active_parent,
                    to_parent: over_parent,
                    after: gesture.over_id.clone(),
                })
            }
        }
        (NodeRef::Root { .. }, NodeRef::Child { .. }) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use imune_core::types::UserId;
    use imune_entity::category::{Category, RootCategory, Subcategory};

    fn category(id: &str) -> Category {
        let now = Utc::now();
        Category {
            id: CategoryId::new(id),
            name: id.to_string(),
            description: None,
            color: "#f97316".to_string(),
            parent_id: None,
            position: 0,
            file_count: 0,
            is_active: true,
            owner_id: UserId::new("admin"),
            created_at: now,
            updated_at: now,
        }
    }

    fn tree() -> CategoryTree {
        let mut x = RootCategory::new(category("x"));
        for id in ["a", "b", "c"] {
            x.children
                .push(Subcategory::new(CategoryId::new("x"), category(id)));
        }
        let mut y = RootCategory::new(category("y"));
        y.children
            .push(Subcategory::new(CategoryId::new("y"), category("d")));
        CategoryTree {
            roots: vec![x, y],
        }
    }

    #[test]
    fn test_child_onto_parent_is_reparent() {
        let op = classify_move(&tree(), &MoveGesture::new("a", "y")).unwrap();
        assert_eq!(
            op,
            MoveOperation::ReparentChild {
                category_id: CategoryId::new("a"),
                from_parent: CategoryId::new("x"),
                to_parent: CategoryId::new("y"),
            }
        );
    }

    #[test]
    fn test_parent_onto_parent_is_demote() {
        let op = classify_move(&tree(), &MoveGesture::new("x", "y")).unwrap();
        assert_eq!(
            op,
            MoveOperation::DemoteParent {
                category_id: CategoryId::new("x"),
                new_parent: CategoryId::new("y"),
                carried: vec![CategoryId::new("a"), CategoryId::new("b"), CategoryId::new("c")],
            }
        );
    }

    #[test]
    fn test_sibling_onto_sibling_is_reorder() {
        let op = classify_move(&tree(), &MoveGesture::new("a", "c")).unwrap();
        assert_eq!(
            op,
            MoveOperation::ReorderSiblings {
                parent_id: CategoryId::new("x"),
                category_id: CategoryId::new("a"),
                from_index: 0,
                to_index: 2,
            }
        );
    }

    #[test]
    fn test_child_onto_foreign_child_is_transfer() {
        let op = classify_move(&tree(), &MoveGesture::new("b", "d")).unwrap();
        assert_eq!(op.kind(), "transfer_child");
        assert_eq!(op.category_id().as_str(), "b");
    }

    #[test]
    fn test_malformed_gestures_are_ignored() {
        let tree = tree();
        assert!(classify_move(&tree, &MoveGesture::new("a", "a")).is_none());
        assert!(classify_move(&tree, &MoveGesture::new("a", "missing")).is_none());
        assert!(classify_move(&tree, &MoveGesture::new("missing", "x")).is_none());
        assert!(classify_move(&tree, &MoveGesture::new("x", "d")).is_none());
    }

    #[test]
    fn test_operation_serializes_with_tag() {
        let op = MoveOperation::PromoteChild {
            category_id: CategoryId::new("a"),
            from_parent: CategoryId::new("x"),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["operation"], "promote_child");
    }
}
