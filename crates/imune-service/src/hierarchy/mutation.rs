//! Optimistic tree edits and the persistence plan they produce.

use imune_core::error::AppError;
use imune_core::result::AppResult;
use imune_core::types::CategoryId;
use imune_entity::category::{CategoryTree, HierarchyUpdate, NodeRef, RootCategory, Subcategory};

use super::operation::MoveOperation;

/// Apply `op` to `tree` and return the remote updates that reproduce it.
///
/// Positions in the plan are indices in the edited tree, in the order the
/// backend must receive them. On error the tree may be partially edited;
/// callers restore their snapshot.
pub fn apply_operation(
    tree: &mut CategoryTree,
    op: &MoveOperation,
) -> AppResult<Vec<HierarchyUpdate>> {
    let plan = match op {
        MoveOperation::ReparentChild {
            category_id,
            to_parent,
            ..
        } => {
            let child = take_child(tree, category_id)?;
            let target = root_mut(tree, to_parent)?;
            target.children.push(reparented(child, to_parent));
            vec![update(category_id, Some(to_parent), target.children.len() - 1)]
        }
        MoveOperation::DemoteParent {
            category_id,
            new_parent,
            ..
        } => {
            let index = tree
                .root_index(category_id.as_str())
                .ok_or_else(|| stale(category_id))?;
            if tree.roots[index].id() == new_parent {
                return Err(AppError::validation("A category cannot be its own parent"));
            }
            let demoted = tree.roots.remove(index);
            let target = root_mut(tree, new_parent)?;
            let start = target.children.len();
            let moved = demoted.demote_into(new_parent);
            let plan: Vec<HierarchyUpdate> = moved
                .iter()
                .enumerate()
                .map(|(offset, sub)| update(sub.id(), Some(new_parent), start + offset))
                .collect();
            target.children.extend(moved);
            plan
        }
        MoveOperation::ReorderSiblings {
            parent_id,
            category_id,
            from_index,
            to_index,
        } => {
            let parent = root_mut(tree, parent_id)?;
            let from = parent
                .child_index(category_id.as_str())
                .filter(|i| i == from_index)
                .ok_or_else(|| stale(category_id))?;
            let to = (*to_index).min(parent.children.len() - 1);
            array_move(&mut parent.children, from, to);
            vec![update(category_id, Some(parent_id), to)]
        }
        MoveOperation::TransferChild {
            category_id,
            to_parent,
            after,
            ..
        } => {
            let child = take_child(tree, category_id)?;
            let target = root_mut(tree, to_parent)?;
            let at = target
                .child_index(after.as_str())
                .map(|i| i + 1)
                .ok_or_else(|| stale(after))?;
            target.children.insert(at, reparented(child, to_parent));
            vec![update(category_id, Some(to_parent), at)]
        }
        MoveOperation::PromoteChild { category_id, .. } => {
            let child = take_child(tree, category_id)?;
            tree.roots.push(child.into_root());
            vec![update(category_id, None, tree.roots.len() - 1)]
        }
    };

    renumber(tree);
    Ok(plan)
}

/// Build the promotion of a subcategory, or `None` if `id` is not one.
pub fn promotion(tree: &CategoryTree, id: &CategoryId) -> Option<MoveOperation> {
    match tree.locate(id.as_str())? {
        NodeRef::Child { parent_id, .. } => Some(MoveOperation::PromoteChild {
            category_id: id.clone(),
            from_parent: parent_id,
        }),
        NodeRef::Root { .. } => None,
    }
}

/// Move the element at `from` so that it ends up at index `to`, keeping the
/// relative order of everything else.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

/// Rewrite every `position` to match the tree's current order.
pub fn renumber(tree: &mut CategoryTree) {
    for (i, root) in tree.roots.iter_mut().enumerate() {
        root.category.position = i as i32;
        for (j, child) in root.children.iter_mut().enumerate() {
            child.category.position = j as i32;
        }
    }
}

fn take_child(tree: &mut CategoryTree, id: &CategoryId) -> AppResult<Subcategory> {
    match tree.locate(id.as_str()) {
        Some(NodeRef::Child {
            parent_index,
            index,
            ..
        }) => Ok(tree.roots[parent_index].children.remove(index)),
        _ => Err(stale(id)),
    }
}

fn root_mut<'a>(tree: &'a mut CategoryTree, id: &CategoryId) -> AppResult<&'a mut RootCategory> {
    tree.roots
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or_else(|| stale(id))
}

fn reparented(mut child: Subcategory, parent: &CategoryId) -> Subcategory {
    child.reparent(parent.clone());
    child
}

fn update(id: &CategoryId, parent: Option<&CategoryId>, position: usize) -> HierarchyUpdate {
    HierarchyUpdate {
        category_id: id.clone(),
        parent_id: parent.cloned(),
        position: position as i32,
    }
}

fn stale(id: &CategoryId) -> AppError {
    AppError::not_found(format!("Category '{id}' is no longer in the hierarchy"))
}
