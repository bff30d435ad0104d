//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Item store settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Scan range and walk bounds
    #[serde(default)]
    pub scan: ScanConfig,

    /// Outbound webhook settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Tracked user
    #[serde(default)]
    pub watch: WatchConfig,

    /// Keyword groups for the text classifier
    #[serde(default)]
    pub keywords: KeywordConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override settings from the process environment.
    ///
    /// - `SLACK_WEBHOOK`: outbound webhook endpoint
    /// - `HN_WATCHED_USER`: watched username (empty string disables)
    /// - `HN_API_BASE_URL`: item store base URL
    /// - `LOOKBACK`: first-run lookback window
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SLACK_WEBHOOK") {
            self.notifier.webhook_url = Some(url);
        }

        if let Some(user) = var("HN_WATCHED_USER") {
            let user = user.trim();
            self.watch.username = (!user.is_empty()).then(|| user.to_string());
        }

        if let Some(base) = var("HN_API_BASE_URL") {
            self.api.base_url = base;
        }

        if let Some(lookback) = var("LOOKBACK") {
            match lookback.parse() {
                Ok(n) => self.scan.lookback = n,
                Err(_) => log::warn!("Ignoring invalid LOOKBACK value {:?}", lookback),
            }
        }
    }

    /// The webhook endpoint, or a fatal configuration error when absent.
    pub fn webhook_url(&self) -> Result<&str> {
        self.notifier
            .webhook_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::config("slack webhook URL not found"))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url)?;
        Url::parse(&self.api.item_url)?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.notifier.timeout_secs == 0 {
            return Err(AppError::validation("notifier.timeout_secs must be > 0"));
        }
        if let Some(url) = self.notifier.webhook_url.as_deref() {
            Url::parse(url)?;
        }
        if self.scan.lookback == 0 {
            return Err(AppError::validation("scan.lookback must be > 0"));
        }
        if self.scan.max_chain_depth == 0 {
            return Err(AppError::validation("scan.max_chain_depth must be > 0"));
        }
        if self.scan.max_item_age_mins.is_some() && self.scan.max_item_age().is_none() {
            return Err(AppError::validation("scan.max_item_age_mins is out of range"));
        }
        if self.keywords.standalone.is_empty()
            && (self.keywords.primary.is_empty() || self.keywords.qualifier.is_empty())
        {
            return Err(AppError::validation("No keywords defined"));
        }
        Ok(())
    }
}

/// Item store client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the item API (`{base}/item/{id}.json`)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Permalink prefix; the item id is appended
    #[serde(default = "defaults::item_url")]
    pub item_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::api_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            item_url: defaults::item_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::api_timeout(),
        }
    }
}

/// Scan bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Ids scanned on the first run, when no cursor exists
    #[serde(default = "defaults::lookback")]
    pub lookback: u64,

    /// Hop limit for the ancestor walk
    #[serde(default = "defaults::max_chain_depth")]
    pub max_chain_depth: usize,

    /// Skip items older than this many minutes (disabled when unset)
    #[serde(default)]
    pub max_item_age_mins: Option<u64>,
}

impl ScanConfig {
    /// Freshness cutoff as a duration. `None` when disabled or too large to
    /// represent.
    pub fn max_item_age(&self) -> Option<Duration> {
        self.max_item_age_mins
            .and_then(|mins| i64::try_from(mins).ok())
            .and_then(Duration::try_minutes)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback: defaults::lookback(),
            max_chain_depth: defaults::max_chain_depth(),
            max_item_age_mins: None,
        }
    }
}

/// Outbound webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Slack incoming webhook URL
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Timeout for the webhook POST
    #[serde(default = "defaults::notifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: defaults::notifier_timeout(),
        }
    }
}

/// Watched user. Absence disables every authorship rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WatchConfig {
    #[serde(default)]
    pub username: Option<String>,
}

/// Keyword groups: `(primary AND qualifier) OR standalone`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "defaults::primary")]
    pub primary: Vec<String>,

    #[serde(default = "defaults::qualifier")]
    pub qualifier: Vec<String>,

    #[serde(default = "defaults::standalone")]
    pub standalone: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            primary: defaults::primary(),
            qualifier: defaults::qualifier(),
            standalone: defaults::standalone(),
        }
    }
}

mod defaults {
    // Api defaults
    pub fn base_url() -> String {
        "https://hacker-news.firebaseio.com/v0".into()
    }
    pub fn item_url() -> String {
        "https://news.ycombinator.com/item?id=".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; alerts/0.1)".into()
    }
    pub fn api_timeout() -> u64 {
        30
    }

    // Scan defaults
    pub fn lookback() -> u64 {
        1000
    }
    pub fn max_chain_depth() -> usize {
        crate::pipeline::DEFAULT_MAX_CHAIN_DEPTH
    }

    // Notifier defaults
    pub fn notifier_timeout() -> u64 {
        5
    }

    // Keyword defaults
    pub fn primary() -> Vec<String> {
        vec!["lambda".into(), "lambdas".into(), "faas".into()]
    }
    pub fn qualifier() -> Vec<String> {
        vec!["go".into(), "golang".into()]
    }
    pub fn standalone() -> Vec<String> {
        vec!["serverless".into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.api.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_chain_depth() {
        let mut config = Config::default();
        config.scan.max_chain_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unrepresentable_item_age() {
        let mut config = Config::default();
        config.scan.max_item_age_mins = Some(u64::MAX);
        assert!(config.scan.max_item_age().is_none());
        assert!(config.validate().is_err());

        config.scan.max_item_age_mins = Some(10);
        assert_eq!(config.scan.max_item_age(), Some(Duration::minutes(10)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_keywords() {
        let mut config = Config::default();
        config.keywords.standalone.clear();
        config.keywords.qualifier.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn webhook_url_missing_is_config_error() {
        let config = Config::default();
        assert!(matches!(config.webhook_url(), Err(AppError::Config(_))));
    }

    #[test]
    fn parse_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [watch]
            username = "pg"

            [scan]
            lookback = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.watch.username.as_deref(), Some("pg"));
        assert_eq!(config.scan.lookback, 50);
        assert_eq!(config.scan.max_chain_depth, 100);
        assert_eq!(config.notifier.timeout_secs, 5);
        assert_eq!(config.keywords.standalone, vec!["serverless"]);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        config.apply_vars(|name| match name {
            "SLACK_WEBHOOK" => Some("https://hooks.slack.com/services/T/B/X".into()),
            "HN_WATCHED_USER" => Some(" tptacek ".into()),
            "LOOKBACK" => Some("250".into()),
            _ => None,
        });
        assert_eq!(
            config.webhook_url().unwrap(),
            "https://hooks.slack.com/services/T/B/X"
        );
        assert_eq!(config.watch.username.as_deref(), Some("tptacek"));
        assert_eq!(config.scan.lookback, 250);
    }

    #[test]
    fn empty_watched_user_disables() {
        let mut config = Config::default();
        config.watch.username = Some("pg".into());
        config.apply_vars(|name| (name == "HN_WATCHED_USER").then(String::new));
        assert!(config.watch.username.is_none());
    }
}
