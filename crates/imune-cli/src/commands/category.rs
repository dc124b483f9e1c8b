//! Category hierarchy CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use imune_core::error::AppError;
use imune_core::types::{CategoryId, UserId};
use imune_entity::category::{Category, CategoryPatch, CategoryTree, NewCategory};
use imune_service::{HierarchyService, MoveGesture, MoveOutcome};

/// Arguments for category commands
#[derive(Debug, Args)]
pub struct CategoryArgs {
    /// Category subcommand
    #[command(subcommand)]
    pub command: CategoryCommand,
}

/// Category subcommands
#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// Show the category tree
    Tree,
    /// Show which operation dropping ACTIVE onto OVER would perform
    Classify {
        /// Dragged category ID
        active: String,
        /// Drop target category ID
        over: String,
    },
    /// Drop ACTIVE onto OVER and persist the result
    Move {
        /// Dragged category ID
        active: String,
        /// Drop target category ID
        over: String,
    },
    /// Turn a subcategory into a root category
    Promote {
        /// Subcategory ID
        id: String,
    },
    /// Create a category, or a subcategory with --parent
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Color as #RRGGBB
        #[arg(short, long, default_value = "#3b82f6")]
        color: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Parent root category ID
        #[arg(short, long)]
        parent: Option<String>,
        /// Creating user ID
        #[arg(long, default_value = "admin")]
        owner: String,
    },
    /// Edit a category
    Update {
        /// Category ID
        id: String,
        /// New display name
        #[arg(short, long)]
        name: Option<String>,
        /// New color as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,
        /// New description (empty clears it)
        #[arg(short, long)]
        description: Option<String>,
        /// Show or hide on the public site
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a category
    Delete {
        /// Category ID
        id: String,
    },
}

/// Category display row
#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    /// Category ID
    id: String,
    /// Name, indented under its parent
    name: String,
    /// Position among siblings
    position: i32,
    /// Color
    color: String,
    /// Files
    files: u64,
    /// Visible
    active: String,
}

impl CategoryRow {
    fn from_category(category: &Category, depth: usize) -> Self {
        let name = if depth == 0 {
            category.name.clone()
        } else {
            format!("└ {}", category.name)
        };
        Self {
            id: category.id.to_string(),
            name,
            position: category.position,
            color: category.color.clone(),
            files: category.file_count,
            active: if category.is_active { "✓" } else { "" }.to_string(),
        }
    }
}

/// Execute category commands
pub async fn execute(
    args: &CategoryArgs,
    service: &HierarchyService,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        CategoryCommand::Tree => print_tree(&service.tree().await, format),
        CategoryCommand::Classify { active, over } => {
            let gesture = MoveGesture::new(active.as_str(), over.as_str());
            match service.classify_move(&gesture).await {
                Some(op) => output::print_item(&op, format),
                None => output::print_warning(&format!(
                    "Dropping '{}' onto '{}' does nothing",
                    active, over
                )),
            }
        }
        CategoryCommand::Move { active, over } => {
            let gesture = MoveGesture::new(active.as_str(), over.as_str());
            report(service.apply_move(&gesture).await, service, format).await?;
        }
        CategoryCommand::Promote { id } => {
            let id: CategoryId = id.parse()?;
            report(service.promote_subcategory(&id).await, service, format).await?;
        }
        CategoryCommand::Create {
            name,
            color,
            description,
            parent,
            owner,
        } => {
            let input = NewCategory {
                name: name.clone(),
                description: description.clone(),
                color: color.clone(),
                owner_id: UserId::new(owner.as_str()),
            };
            let created = match parent {
                Some(parent) => {
                    let parent: CategoryId = parent.parse()?;
                    service.create_subcategory(&parent, input).await?
                }
                None => service.create_category(input).await?,
            };
            if format == OutputFormat::Json {
                output::print_item(&created, format);
            } else {
                output::print_kv("ID", created.id.as_str());
            }
        }
        CategoryCommand::Update {
            id,
            name,
            color,
            description,
            active,
        } => {
            let id: CategoryId = id.parse()?;
            let patch = CategoryPatch {
                name: name.clone(),
                description: description.clone(),
                color: color.clone(),
                is_active: *active,
            };
            let updated = service.update_category(&id, patch).await?;
            if format == OutputFormat::Json {
                output::print_item(&updated, format);
            }
        }
        CategoryCommand::Delete { id } => {
            let id: CategoryId = id.parse()?;
            service.delete_category(&id).await?;
        }
    }

    Ok(())
}

/// Print the outcome of a structural move; a rollback is an error.
async fn report(
    outcome: MoveOutcome,
    service: &HierarchyService,
    format: OutputFormat,
) -> Result<(), AppError> {
    match outcome {
        MoveOutcome::Ignored => output::print_warning("Nothing to move"),
        MoveOutcome::Busy => {
            output::print_warning("Another category change is still being saved")
        }
        MoveOutcome::Committed(_) => print_tree(&service.tree().await, format),
        MoveOutcome::RolledBack { reason, .. } => return Err(reason),
    }
    Ok(())
}

fn print_tree(tree: &CategoryTree, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_item(tree, format);
        return;
    }

    let rows: Vec<CategoryRow> = tree
        .roots
        .iter()
        .flat_map(|root| {
            std::iter::once(CategoryRow::from_category(&root.category, 0)).chain(
                root.children
                    .iter()
                    .map(|child| CategoryRow::from_category(&child.category, 1)),
            )
        })
        .collect();
    output::print_list(&rows, format);
}
