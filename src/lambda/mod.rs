// src/lambda/mod.rs

//! AWS Lambda handler for the alert engine.
//!
//! Invoked by a scheduled rule. Each invocation:
//! 1. Builds configuration from defaults + environment
//! 2. Opens S3-backed state (cursor + dedup markers)
//! 3. Runs one engine scan and reports the counters

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{AlertEngine, RunSummary};
use crate::storage::s3::S3Storage;

/// Lambda invocation payload.
#[derive(Debug, Deserialize, Default)]
pub struct AlertRequest {
    /// Log messages instead of posting them
    #[serde(default)]
    pub dry_run: bool,
}

/// Lambda response payload.
#[derive(Debug, Serialize, Default)]
pub struct AlertResponse {
    /// Whether the run completed
    pub success: bool,

    /// Items scanned in this run
    pub scanned: usize,

    /// Notifications delivered
    pub notified: usize,

    /// Full run counters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<AlertRequest>,
) -> std::result::Result<AlertResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting alert run: dry_run={}", request.dry_run);

    match run_alerts(&request).await {
        Ok(summary) => {
            let response = AlertResponse {
                success: true,
                scanned: summary.scanned,
                notified: summary.notified,
                summary: Some(summary),
                error: None,
                execution_time_ms: start.elapsed().as_millis() as u64,
            };
            info!(
                "Alert run completed: {} scanned, {} notified in {}ms",
                response.scanned, response.notified, response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Alert run failed: {}", e);
            Ok(AlertResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

/// Internal run logic.
async fn run_alerts(request: &AlertRequest) -> Result<RunSummary> {
    let config = load_lambda_config();
    let storage = S3Storage::from_env().await?;

    let engine = AlertEngine::from_config(&config, Arc::new(storage), request.dry_run)?;
    engine.run().await
}

/// Load configuration suitable for Lambda environment.
fn load_lambda_config() -> Config {
    let mut config = Config::default();
    config.apply_env();

    if let Ok(timeout) = std::env::var("API_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse() {
            config.api.timeout_secs = secs;
        }
    }

    if let Ok(age) = std::env::var("MAX_ITEM_AGE_MINS") {
        if let Ok(mins) = age.parse() {
            config.scan.max_item_age_mins = Some(mins);
        }
    }

    config
}
