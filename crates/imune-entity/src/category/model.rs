//! Category entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use imune_core::types::{CategoryId, UserId};

/// A training-content category as stored in the remote categories table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Display color as `#RRGGBB`.
    pub color: String,
    /// Parent category (null for root categories).
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// Sibling order; lower comes first.
    #[serde(default)]
    pub position: i32,
    /// Number of files filed under this category. Informational only.
    #[serde(default)]
    pub file_count: u64,
    /// Whether the category is visible on the public site.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// The user who created the category.
    #[serde(alias = "created_by")]
    pub owner_id: UserId,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Check if this is a root category (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// User input for a new category or subcategory.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCategory {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Category name must be 1 to 100 characters"))]
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Display color as `#RRGGBB`.
    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,
    /// Creating user.
    pub owner_id: UserId,
}

/// Data sent to the store to create a category row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategoryRecord {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Display color.
    pub color: String,
    /// Parent category (None for a root category).
    pub parent_id: Option<CategoryId>,
    /// Position among the new siblings.
    pub position: i32,
    /// Visibility flag.
    pub is_active: bool,
    /// Creating user.
    #[serde(rename = "created_by")]
    pub owner_id: UserId,
}

/// Partial update of the editable, non-structural fields.
///
/// `None` leaves a field untouched. An empty description clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CategoryPatch {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Category name must be 1 to 100 characters"))]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New color.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    /// New visibility flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CategoryPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.is_active.is_none()
    }

    /// Apply the patch to a category in place.
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
        if let Some(description) = &self.description {
            category.description = if description.trim().is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(color) = &self.color {
            category.color = color.clone();
        }
        if let Some(active) = self.is_active {
            category.is_active = active;
        }
    }
}

/// Accept `#RRGGBB` colors, case-insensitive.
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("hex_color");
        error.message = Some(format!("Invalid color '{color}', expected #RRGGBB").into());
        Err(error)
    }
}

/// One structural persistence instruction: place `category_id` under
/// `parent_id` (None for the root list) at index `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyUpdate {
    /// Category being placed.
    pub category_id: CategoryId,
    /// New parent, or None to make it a root category.
    pub parent_id: Option<CategoryId>,
    /// Zero-based index among the new siblings.
    pub position: i32,
}

fn default_true() -> bool {
    true
}
