//! Service layer for the alert engine.
//!
//! - Item fetching (`HackerNewsClient`)
//! - Text classification (`KeywordClassifier`)
//! - Message formatting (`Dispatcher`)
//! - Outbound delivery (`SlackWebhook`, `LogNotifier`)

mod api;
mod classifier;
mod dispatch;
mod notifier;

pub use api::{HackerNewsClient, ItemSource, parse_item, parse_max_item};
pub use classifier::{KeywordClassifier, strip_html, tokenize};
pub use dispatch::Dispatcher;
pub use notifier::{LogNotifier, Notifier, SlackWebhook};
