//! Remote category store configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which category store implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// PostgREST-compatible backend-as-a-service.
    Rest,
    /// In-process store, optionally seeded from a JSON file.
    Memory,
}

/// Backend-as-a-service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Store implementation.
    #[serde(default = "default_provider")]
    pub provider: BackendProvider,
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: String,
    /// Anonymous or service API key sent as `apikey` and bearer token.
    #[serde(default)]
    pub api_key: String,
    /// Name of the categories table.
    #[serde(default = "default_table")]
    pub table: String,
    /// Remote procedure that re-parents and re-positions one category.
    #[serde(default = "default_hierarchy_function")]
    pub hierarchy_function: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// JSON file with initial records for the memory provider.
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: String::new(),
            api_key: String::new(),
            table: default_table(),
            hierarchy_function: default_hierarchy_function(),
            timeout_seconds: default_timeout(),
            seed_file: None,
        }
    }
}

impl BackendConfig {
    /// Check that the selected provider has everything it needs.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.provider == BackendProvider::Rest {
            if self.url.trim().is_empty() {
                return Err(AppError::configuration(
                    "backend.url is required for the rest provider",
                ));
            }
            if self.api_key.trim().is_empty() {
                return Err(AppError::configuration(
                    "backend.api_key is required for the rest provider",
                ));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "backend.timeout_seconds must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_provider() -> BackendProvider {
    BackendProvider::Memory
}

fn default_table() -> String {
    "categories".to_string()
}

fn default_hierarchy_function() -> String {
    "update_category_hierarchy".to_string()
}

fn default_timeout() -> u64 {
    15
}
