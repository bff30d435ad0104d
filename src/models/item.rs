//! Feed item data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a feed item.
///
/// Anything other than a story or a comment (jobs, polls, poll options)
/// collapses into `Other` and is ignored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
    #[default]
    #[serde(other)]
    Other,
}

/// A story or comment as returned by the item store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Item {
    /// Unique, monotonically assigned id
    pub id: u64,

    /// Item kind (`type` on the wire)
    #[serde(rename = "type", default)]
    pub kind: ItemKind,

    /// Removed by its author
    #[serde(default)]
    pub deleted: bool,

    /// Killed by moderation or flags
    #[serde(default)]
    pub dead: bool,

    /// Story title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Comment or story body (HTML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Author username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,

    /// Immediate parent (comments only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,

    /// Creation time, unix seconds
    #[serde(default)]
    pub time: i64,

    /// Link target for link stories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Item {
    /// Whether the item was deleted or killed and must not be processed.
    pub fn is_removed(&self) -> bool {
        self.dead || self.deleted
    }

    pub fn is_story(&self) -> bool {
        self.kind == ItemKind::Story
    }

    pub fn is_comment(&self) -> bool {
        self.kind == ItemKind::Comment
    }

    /// Title and body joined for classification.
    pub fn searchable_text(&self) -> String {
        let title = self.title.as_deref().unwrap_or_default();
        let text = self.text.as_deref().unwrap_or_default();
        format!("{} {}", title, text).trim().to_string()
    }

    /// Whether `user` authored this item. Case-sensitive, as usernames are.
    pub fn is_authored_by(&self, user: &str) -> bool {
        self.by.as_deref() == Some(user)
    }

    /// Creation time, if the item carries one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        if self.time == 0 {
            return None;
        }
        DateTime::from_timestamp(self.time, 0)
    }

    /// Title if present and non-empty.
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}
