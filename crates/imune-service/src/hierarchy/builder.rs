//! Rebuilds the two-level tree from the flat remote category list.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use imune_core::types::CategoryId;
use imune_entity::category::{Category, CategoryTree, RootCategory, Subcategory};

/// Group a flat category list into roots and their children.
///
/// Records are ordered by position (stable, so ties keep remote order).
/// Every record ends up in the tree exactly once:
/// - a record whose parent is unknown becomes a root,
/// - a record nested deeper than one level is attached to its topmost
///   ancestor,
/// - records caught in a parent cycle become roots,
/// - duplicate ids after the first occurrence are dropped.
pub fn build_tree(mut records: Vec<Category>) -> CategoryTree {
    records.sort_by_key(|c| c.position);

    let mut seen = HashSet::new();
    records.retain(|c| {
        let fresh = seen.insert(c.id.clone());
        if !fresh {
            warn!(category_id = %c.id, "Dropping duplicate category record");
        }
        fresh
    });

    let parents: HashMap<&str, Option<&str>> = records
        .iter()
        .map(|c| (c.id.as_str(), c.parent_id.as_ref().map(|p| p.as_str())))
        .collect();

    let owners: Vec<Option<CategoryId>> = records
        .iter()
        .map(|c| topmost_ancestor(c, &parents).map(CategoryId::new))
        .collect();

    let mut tree = CategoryTree::empty();
    let mut children: Vec<(CategoryId, Category)> = Vec::new();

    for (record, owner) in records.into_iter().zip(owners) {
        match owner {
            None => {
                if let Some(parent) = &record.parent_id {
                    warn!(category_id = %record.id, parent_id = %parent, "Parent unavailable, promoting to root");
                }
                tree.roots.push(RootCategory::new(record));
            }
            Some(owner) => children.push((owner, record)),
        }
    }

    let root_positions: HashMap<CategoryId, usize> = tree
        .roots
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id().clone(), i))
        .collect();

    for (owner, record) in children {
        if record.parent_id.as_ref() != Some(&owner) {
            warn!(category_id = %record.id, root_id = %owner, "Flattening nested category under its root");
        }
        if let Some(&index) = root_positions.get(&owner) {
            tree.roots[index].children.push(Subcategory::new(owner, record));
        }
    }

    tree
}

/// The root that owns `record`, or `None` if the record is itself a root.
fn topmost_ancestor<'a>(
    record: &'a Category,
    parents: &HashMap<&'a str, Option<&'a str>>,
) -> Option<&'a str> {
    let start = record.id.as_str();
    let mut current = start;
    let mut visited = HashSet::from([start]);

    while let Some(parent) = parents.get(current).copied().flatten() {
        if !parents.contains_key(parent) {
            break;
        }
        if !visited.insert(parent) {
            return None;
        }
        current = parent;
    }

    (current != start).then_some(current)
}
