//! AWS Lambda entry point for the alert engine
//!
//! Deploy with `cargo lambda build --release --features lambda` and attach
//! a scheduled rule (e.g. every 5 minutes).
//!
//! ## Environment Variables
//!
//! - `SLACK_WEBHOOK`: Slack incoming webhook URL (required unless dry run)
//! - `HN_WATCHED_USER`: username whose stories and comments are tracked
//! - `S3_BUCKET` / `S3_PREFIX`: location of cursor and dedup markers
//! - `LOOKBACK`: ids scanned on the very first run
//! - `MAX_ITEM_AGE_MINS`: skip items older than this
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use alerts::lambda::handler;
use lambda_runtime::{Error as LambdaError, service_fn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("HN alerts Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
