//! CLI command definitions and dispatch.

pub mod category;
pub mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::{self, OutputFormat};
use imune_core::config::AppConfig;
use imune_core::error::AppError;
use imune_core::traits::Notifier;
use imune_service::HierarchyService;
use imune_service::notification::{RecordingNotifier, TracingNotifier};
use imune_store::CategoryStoreManager;

/// IMUNE+ category administration for the training portal
#[derive(Debug, Parser)]
#[command(name = "imune-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Where user-facing notifications go
    #[arg(long, value_enum, default_value = "print")]
    pub notifications: NotifyMode,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Notification delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifyMode {
    /// Print after each command
    Print,
    /// Emit as log events
    Log,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Category hierarchy management
    Category(category::CategoryArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Category(args) => {
                let engine = Engine::connect(&config, self.notifications).await?;
                let result = category::execute(args, &engine.service, self.format).await;
                engine.flush();
                result
            }
            Commands::Config(args) => config::execute(args, &self.config, config, self.format),
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {}", e.message)))
}

/// Hierarchy engine plus the recorder whose messages are printed afterwards.
pub struct Engine {
    /// Loaded engine.
    pub service: Arc<HierarchyService>,
    recorder: Option<Arc<RecordingNotifier>>,
}

impl Engine {
    /// Build the configured store, wire the engine, and load the tree.
    pub async fn connect(config: &AppConfig, mode: NotifyMode) -> Result<Self, AppError> {
        let store = CategoryStoreManager::new(&config.backend).await?;

        let recorder = match mode {
            NotifyMode::Print => Some(Arc::new(RecordingNotifier::new())),
            NotifyMode::Log => None,
        };
        let notifier: Arc<dyn Notifier> = match &recorder {
            Some(recorder) => recorder.clone(),
            None => Arc::new(TracingNotifier),
        };

        let service = Arc::new(HierarchyService::new(Arc::new(store), notifier));
        let engine = Self { service, recorder };
        if let Err(e) = engine.service.load_hierarchy().await {
            engine.flush();
            return Err(e);
        }
        Ok(engine)
    }

    /// Print and clear recorded notifications.
    pub fn flush(&self) {
        if let Some(recorder) = &self.recorder {
            output::print_notifications(&recorder.drain());
        }
    }
}
