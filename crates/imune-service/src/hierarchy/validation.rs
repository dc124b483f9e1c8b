//! Input normalisation for category create/update.
//!
//! Field rules live on the payload types (`#[derive(Validate)]`); this module
//! trims input and maps rule violations into [`AppError`].

use validator::{Validate, ValidationErrors};

use imune_core::error::AppError;
use imune_core::result::AppResult;
use imune_entity::category::{CategoryPatch, NewCategory};

/// Trim and validate creation input. Colors are stored lowercase.
pub fn prepare_new(input: NewCategory) -> AppResult<NewCategory> {
    let prepared = NewCategory {
        name: input.name.trim().to_string(),
        description: normalize_description(input.description.as_deref()),
        color: input.color.trim().to_ascii_lowercase(),
        owner_id: input.owner_id,
    };
    prepared.validate().map_err(invalid)?;
    Ok(prepared)
}

/// Trim and validate every field a patch sets.
pub fn prepare_patch(patch: &CategoryPatch) -> AppResult<CategoryPatch> {
    if patch.is_empty() {
        return Err(AppError::validation("Nothing to update"));
    }
    let prepared = CategoryPatch {
        name: patch.name.as_deref().map(|n| n.trim().to_string()),
        description: patch.description.as_deref().map(|d| d.trim().to_string()),
        color: patch
            .color
            .as_deref()
            .map(|c| c.trim().to_ascii_lowercase()),
        is_active: patch.is_active,
    };
    prepared.validate().map_err(invalid)?;
    Ok(prepared)
}

/// Trim a description; blank means none.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

fn invalid(errors: ValidationErrors) -> AppError {
    AppError::validation(errors.to_string())
}
