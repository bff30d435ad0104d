//! HN alerts CLI
//!
//! Local execution entry point. For AWS Lambda, use `alerts-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use alerts::{
    error::Result,
    models::Config,
    pipeline::AlertEngine,
    services::KeywordClassifier,
    storage::{LocalStorage, StateStore},
};
use clap::{Parser, Subcommand};

/// HN alerts - keyword and user activity notifications
#[derive(Parser, Debug)]
#[command(
    name = "alerts",
    version,
    about = "Hacker News keyword and user activity alerts"
)]
struct Cli {
    /// Path to storage directory containing config.toml and state
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan new items once and send notifications
    Run {
        /// Log messages instead of posting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the notifications a single item would produce
    Inspect {
        /// Item id
        id: u64,
    },

    /// Test text against the keyword classifier
    Classify {
        /// Text (HTML allowed)
        text: String,
    },

    /// Validate configuration file
    Validate,

    /// Show current cursor
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    config.apply_env();

    log::debug!("Loaded configuration from {}", config_path.display());

    let storage = Arc::new(LocalStorage::new(cli.storage_dir.join("state")));

    match cli.command {
        Command::Run { dry_run } => {
            let engine = AlertEngine::from_config(&config, storage, dry_run)?;
            match engine.watched_user() {
                Some(user) => log::info!("Watching user {}", user),
                None => log::info!("No watched user configured, keyword alerts only"),
            }

            let summary = engine.run().await?;
            log::info!(
                "Scanned ({}, {}]: {} notified, {} failed",
                summary.start_id,
                summary.max_id,
                summary.notified,
                summary.delivery_failures
            );
        }

        Command::Inspect { id } => {
            let engine = AlertEngine::from_config(&config, storage, true)?;
            let events = engine.preview(id).await?;

            if events.is_empty() {
                log::info!("Item {} produces no notifications", id);
            }
            for event in events {
                log::info!(
                    "{} (subject {}, root {}, dedup {})",
                    event.kind,
                    event.subject.id,
                    event.root.id,
                    event.dedup_subject
                );
            }
        }

        Command::Classify { text } => {
            let classifier = KeywordClassifier::new(&config.keywords);
            let tokens = alerts::services::tokenize(&text);
            log::debug!("Tokens: {:?}", tokens);

            if classifier.matches(&text) {
                log::info!("✓ Matches keywords");
            } else {
                log::info!("✗ No keyword match");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            match config.webhook_url() {
                Ok(_) => log::info!("✓ Webhook configured"),
                Err(e) => log::warn!("{} (only `run --dry-run` will work)", e),
            }
            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            let state = StateStore::new(storage);
            match state.cursor().await? {
                Some(id) => log::info!("Cursor: last scanned item {}", id),
                None => log::info!("No cursor yet, next run is a first run."),
            }
        }
    }

    Ok(())
}
