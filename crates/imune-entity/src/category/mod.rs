//! Category domain entities.

pub mod model;
pub mod tree;

pub use model::{
    Category, CategoryPatch, HierarchyUpdate, MAX_NAME_LEN, NewCategory, NewCategoryRecord,
    validate_hex_color,
};
pub use tree::{CategoryTree, NodeRef, RootCategory, Subcategory};
