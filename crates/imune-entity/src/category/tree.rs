//! Two-level category tree used by the admin hierarchy view.

use serde::{Deserialize, Serialize};

use imune_core::types::CategoryId;

use super::model::Category;

/// A second-tier category. The parent reference is explicit and always
/// agrees with `category.parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    parent_id: CategoryId,
    /// The underlying record.
    pub category: Category,
}

impl Subcategory {
    /// Wrap a record as a child of `parent_id`.
    pub fn new(parent_id: CategoryId, mut category: Category) -> Self {
        category.parent_id = Some(parent_id.clone());
        Self {
            parent_id,
            category,
        }
    }

    /// The owning root category.
    pub fn parent_id(&self) -> &CategoryId {
        &self.parent_id
    }

    /// Category identifier.
    pub fn id(&self) -> &CategoryId {
        &self.category.id
    }

    /// Move under another root category.
    pub fn reparent(&mut self, parent_id: CategoryId) {
        self.category.parent_id = Some(parent_id.clone());
        self.parent_id = parent_id;
    }

    /// Promote to the root tier.
    pub fn into_root(self) -> RootCategory {
        RootCategory::new(self.category)
    }
}

/// A top-tier category with its ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCategory {
    /// The underlying record.
    pub category: Category,
    /// Ordered subcategories.
    pub children: Vec<Subcategory>,
}

impl RootCategory {
    /// Wrap a record as a childless root category.
    pub fn new(mut category: Category) -> Self {
        category.parent_id = None;
        Self {
            category,
            children: Vec::new(),
        }
    }

    /// Category identifier.
    pub fn id(&self) -> &CategoryId {
        &self.category.id
    }

    /// Index of a child by id.
    pub fn child_index(&self, id: &str) -> Option<usize> {
        self.children.iter().position(|c| c.id().as_str() == id)
    }

    /// Demote under `parent_id`, returning the node itself followed by its
    /// former children, all re-parented to `parent_id`.
    pub fn demote_into(self, parent_id: &CategoryId) -> Vec<Subcategory> {
        let Self { category, children } = self;
        let mut flattened = Vec::with_capacity(children.len() + 1);
        flattened.push(Subcategory::new(parent_id.clone(), category));
        flattened.extend(children.into_iter().map(|mut child| {
            child.reparent(parent_id.clone());
            child
        }));
        flattened
    }
}

/// Location of a node inside a [`CategoryTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    /// A root category at `index` in the root list.
    Root {
        /// Index in the root list.
        index: usize,
    },
    /// A subcategory at `index` under the root at `parent_index`.
    Child {
        /// Owning root category.
        parent_id: CategoryId,
        /// Index of the owner in the root list.
        parent_index: usize,
        /// Index among the owner's children.
        index: usize,
    },
}

impl NodeRef {
    /// Whether this refers to a root category.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root { .. })
    }
}

/// The complete two-level hierarchy, roots in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTree {
    /// Root categories.
    pub roots: Vec<RootCategory>,
}

impl CategoryTree {
    /// Create an empty tree.
    pub fn empty() -> Self {
        Self { roots: Vec::new() }
    }

    /// Total number of categories at both levels.
    pub fn len(&self) -> usize {
        self.roots.iter().map(|r| 1 + r.children.len()).sum()
    }

    /// Whether the tree holds no categories.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Index of a root category by id.
    pub fn root_index(&self, id: &str) -> Option<usize> {
        self.roots.iter().position(|r| r.id().as_str() == id)
    }

    /// Borrow a root category by id.
    pub fn root(&self, id: &str) -> Option<&RootCategory> {
        self.roots.iter().find(|r| r.id().as_str() == id)
    }

    /// Find where a category lives.
    pub fn locate(&self, id: &str) -> Option<NodeRef> {
        for (parent_index, root) in self.roots.iter().enumerate() {
            if root.id().as_str() == id {
                return Some(NodeRef::Root {
                    index: parent_index,
                });
            }
            if let Some(index) = root.child_index(id) {
                return Some(NodeRef::Child {
                    parent_id: root.id().clone(),
                    parent_index,
                    index,
                });
            }
        }
        None
    }

    /// Borrow any category by id.
    pub fn get(&self, id: &str) -> Option<&Category> {
        match self.locate(id)? {
            NodeRef::Root { index } => Some(&self.roots[index].category),
            NodeRef::Child {
                parent_index,
                index,
                ..
            } => Some(&self.roots[parent_index].children[index].category),
        }
    }

    /// All categories, each root followed by its children.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.roots.iter().flat_map(|root| {
            std::iter::once(&root.category).chain(root.children.iter().map(|c| &c.category))
        })
    }

    /// Ids by level: each root id with its ordered child ids.
    pub fn outline(&self) -> Vec<(CategoryId, Vec<CategoryId>)> {
        self.roots
            .iter()
            .map(|root| {
                (
                    root.id().clone(),
                    root.children.iter().map(|c| c.id().clone()).collect(),
                )
            })
            .collect()
    }
}
