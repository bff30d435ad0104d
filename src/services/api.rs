// src/services/api.rs

//! Item store client.
//!
//! Thin wrapper over the Hacker News Firebase API:
//! `{base}/maxitem.json` and `{base}/item/{id}.json`.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{ApiConfig, Item};
use crate::utils::http;

/// Source of feed items.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetch one item. `Ok(None)` when the id does not exist.
    async fn get_item(&self, id: u64) -> Result<Option<Item>>;

    /// Current maximum item id.
    async fn max_item_id(&self) -> Result<u64>;
}

/// Hacker News API client.
pub struct HackerNewsClient {
    client: Client,
    base_url: String,
}

impl HackerNewsClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_api_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}.json", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::api(url, format!("status {}", status)));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ItemSource for HackerNewsClient {
    async fn get_item(&self, id: u64) -> Result<Option<Item>> {
        let body = self.fetch(&format!("item/{}", id)).await?;
        parse_item(&body)
    }

    async fn max_item_id(&self) -> Result<u64> {
        let body = self.fetch("maxitem").await?;
        parse_max_item(&body)
    }
}

/// Decode an item body; the API answers `null` for unknown ids.
pub fn parse_item(body: &str) -> Result<Option<Item>> {
    Ok(serde_json::from_str::<Option<Item>>(body)?)
}

pub fn parse_max_item(body: &str) -> Result<u64> {
    body.trim()
        .parse()
        .map_err(|e| AppError::api("maxitem", format!("{:?}: {}", body.trim(), e)))
}
