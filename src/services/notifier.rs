// src/services/notifier.rs

//! Outbound notification transports.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::NotifierConfig;
use crate::utils::http;

/// Pluggable outbound transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message. Any non-success outcome is an error.
    async fn send(&self, text: &str) -> Result<()>;
}

/// Slack incoming webhook.
pub struct SlackWebhook {
    webhook_url: String,
    http: Client,
}

impl SlackWebhook {
    pub fn new(webhook_url: impl Into<String>, config: &NotifierConfig) -> Result<Self> {
        Ok(Self {
            webhook_url: webhook_url.into(),
            http: http::create_webhook_client(config)?,
        })
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    async fn send(&self, text: &str) -> Result<()> {
        let payload = json!({
            "text": text,
            "unfurl_links": false,
        });

        let resp = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        check_ack(status.as_u16(), &body)
    }
}

/// Slack acknowledges a delivered message with the literal body `ok`.
fn check_ack(status: u16, body: &str) -> Result<()> {
    if body.trim() == "ok" {
        return Ok(());
    }
    log::warn!("Slack webhook returned non-ok response (status {}): {}", status, body);
    Err(AppError::notify(format!("non-ok response: {}", body)))
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        log::info!("[dry-run] {}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_ok() {
        assert!(check_ack(200, "ok").is_ok());
        assert!(check_ack(200, "ok\n").is_ok());
    }

    #[test]
    fn test_ack_rejects_anything_else() {
        assert!(matches!(check_ack(200, ""), Err(AppError::Notify(_))));
        assert!(check_ack(404, "no_service").is_err());
        assert!(check_ack(400, "invalid_payload").is_err());
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        assert!(LogNotifier.send("hello").await.is_ok());
    }
}
