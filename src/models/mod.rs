// src/models/mod.rs

//! Domain models for the alert engine.

mod config;
mod event;
mod item;

// Re-export all public types
pub use config::{ApiConfig, Config, KeywordConfig, NotifierConfig, ScanConfig, WatchConfig};
pub use event::{NotificationEvent, NotificationKind};
pub use item::{Item, ItemKind};
