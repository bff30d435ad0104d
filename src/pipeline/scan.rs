// src/pipeline/scan.rs

//! One invocation of the alert engine.
//!
//! Reads the cursor, scans `(start, max]` in ascending order, classifies
//! every live story and comment, and advances the cursor to the max id
//! observed at the start of the run.
//!
//! The scan is best effort: items that fail to fetch are skipped and never
//! revisited, because the cursor moves past them regardless.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Config, Item, NotificationEvent, ScanConfig};
use crate::pipeline::walk::{classify, walk_chain};
use crate::services::{
    Dispatcher, HackerNewsClient, ItemSource, KeywordClassifier, LogNotifier, Notifier,
    SlackWebhook,
};
use crate::storage::{KvStore, StateStore};

/// Counters for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Exclusive lower bound of the scanned range
    pub start_id: u64,
    /// Inclusive upper bound; the new cursor
    pub max_id: u64,
    pub scanned: usize,
    pub skipped: usize,
    pub fetch_failures: usize,
    pub malformed_chains: usize,
    pub notified: usize,
    pub duplicates: usize,
    pub delivery_failures: usize,
}

/// Scan bounds resolved from configuration.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub lookback: u64,
    pub max_chain_depth: usize,
    pub max_item_age: Option<Duration>,
}

impl From<&ScanConfig> for ScanSettings {
    fn from(config: &ScanConfig) -> Self {
        Self {
            lookback: config.lookback,
            max_chain_depth: config.max_chain_depth,
            max_item_age: config.max_item_age(),
        }
    }
}

/// First id *not* to scan: the cursor, or `max - lookback` on a first run.
pub fn scan_start(cursor: Option<u64>, max_id: u64, lookback: u64) -> u64 {
    cursor.unwrap_or_else(|| max_id.saturating_sub(lookback))
}

/// The traversal engine.
pub struct AlertEngine {
    source: Arc<dyn ItemSource>,
    state: StateStore,
    dispatcher: Dispatcher,
    classifier: KeywordClassifier,
    watched_user: Option<String>,
    settings: ScanSettings,
}

impl AlertEngine {
    pub fn new(
        config: &Config,
        source: Arc<dyn ItemSource>,
        store: Arc<dyn KvStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            state: StateStore::new(store),
            dispatcher: Dispatcher::new(notifier, config.api.item_url.clone()),
            classifier: KeywordClassifier::new(&config.keywords),
            watched_user: config.watch.username.clone(),
            settings: ScanSettings::from(&config.scan),
        }
    }

    /// Build an engine against the live API and Slack webhook.
    ///
    /// A missing webhook URL is fatal unless `dry_run` is set, in which case
    /// messages are only logged.
    pub fn from_config(config: &Config, store: Arc<dyn KvStore>, dry_run: bool) -> Result<Self> {
        config.validate()?;

        let notifier: Arc<dyn Notifier> = if dry_run {
            Arc::new(LogNotifier)
        } else {
            Arc::new(SlackWebhook::new(config.webhook_url()?, &config.notifier)?)
        };
        let source = Arc::new(HackerNewsClient::new(&config.api)?);

        Ok(Self::new(config, source, store, notifier))
    }

    pub fn watched_user(&self) -> Option<&str> {
        self.watched_user.as_deref()
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Run one scan. Fails only when the cursor cannot be read or written or
    /// the max id cannot be fetched.
    pub async fn run(&self) -> Result<RunSummary> {
        let cursor = self.state.cursor().await?;
        let max_id = self.source.max_item_id().await?;
        let start_id = scan_start(cursor, max_id, self.settings.lookback);

        if cursor.is_none() {
            log::info!(
                "No cursor found, first run scans the last {} items",
                self.settings.lookback
            );
        }
        log::info!("Scanning items ({}, {}]", start_id, max_id);

        // An age reaching past the representable range filters nothing
        let cutoff = self
            .settings
            .max_item_age
            .and_then(|age| Utc::now().checked_sub_signed(age));
        let mut summary = RunSummary {
            start_id,
            max_id,
            ..RunSummary::default()
        };

        for id in start_id.saturating_add(1)..=max_id {
            self.process_item(id, cutoff, &mut summary).await;
        }

        self.state.set_cursor(max_id).await?;

        log::info!(
            "Run complete: {} scanned, {} skipped, {} fetch failures, {} malformed, \
             {} notified, {} duplicates, {} delivery failures",
            summary.scanned,
            summary.skipped,
            summary.fetch_failures,
            summary.malformed_chains,
            summary.notified,
            summary.duplicates,
            summary.delivery_failures
        );
        Ok(summary)
    }

    /// Events one item would produce, without dedup or delivery.
    pub async fn preview(&self, id: u64) -> Result<Vec<NotificationEvent>> {
        let Some(item) = self.source.get_item(id).await? else {
            return Ok(Vec::new());
        };
        if item.is_removed() {
            return Ok(Vec::new());
        }
        self.classify_item(item).await
    }

    async fn classify_item(&self, item: Item) -> Result<Vec<NotificationEvent>> {
        if !(item.is_story() || item.is_comment()) {
            return Ok(Vec::new());
        }
        let chain =
            walk_chain(self.source.as_ref(), item, self.settings.max_chain_depth).await?;
        Ok(classify(&chain, &self.classifier, self.watched_user()))
    }

    async fn process_item(
        &self,
        id: u64,
        cutoff: Option<DateTime<Utc>>,
        summary: &mut RunSummary,
    ) {
        summary.scanned += 1;

        let item = match self.source.get_item(id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                log::debug!("Item {} not found", id);
                summary.skipped += 1;
                return;
            }
            Err(e) => {
                log::warn!("Failed to fetch item {}: {}", id, e);
                summary.fetch_failures += 1;
                return;
            }
        };

        if item.is_removed() || !(item.is_story() || item.is_comment()) {
            summary.skipped += 1;
            return;
        }
        if let Some(cutoff) = cutoff {
            if item.created_at().is_none_or(|created| created < cutoff) {
                summary.skipped += 1;
                return;
            }
        }

        let events = match self.classify_item(item).await {
            Ok(events) => events,
            Err(e) => {
                log::warn!("Skipping item {}: {}", id, e);
                summary.malformed_chains += 1;
                return;
            }
        };

        for event in &events {
            self.deliver(event, summary).await;
        }
    }

    async fn deliver(&self, event: &NotificationEvent, summary: &mut RunSummary) {
        let subject = event.dedup_subject;

        match self.state.already_sent(subject).await {
            Ok(true) => {
                log::debug!("Already notified for {}, dropping {}", subject, event.kind);
                summary.duplicates += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("Dedup lookup failed for {}: {}", subject, e);
                summary.delivery_failures += 1;
                return;
            }
        }

        if let Err(e) = self
            .dispatcher
            .format_and_send(event.kind, &event.subject, &event.root)
            .await
        {
            log::warn!(
                "Failed to send {} for item {}: {}",
                event.kind,
                event.subject.id,
                e
            );
            summary.delivery_failures += 1;
            return;
        }

        log::info!("Sent {} for item {}", event.kind, event.subject.id);
        summary.notified += 1;

        if let Err(e) = self.state.mark_sent(subject, event.kind).await {
            log::error!(
                "Sent {} but failed to record marker for {}: {}",
                event.kind,
                subject,
                e
            );
        }
    }
}
