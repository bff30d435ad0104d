//! Cursor and dedup markers on top of a key-value store.
//!
//! Markers are a monotone set keyed by dedup subject: written once after a
//! successful dispatch, never updated or removed. Writes are not transactional with dispatch, so
//! a crash between the webhook POST and `mark_sent` can resend once on the
//! next run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::NotificationKind;
use crate::storage::{KvStore, read_json, write_json};

/// Key holding the scan cursor.
pub const CURSOR_KEY: &str = "last-item";

/// Prefix of every dedup marker key.
pub const SENT_PREFIX: &str = "sent-items";

/// Marker key for a dedup subject, `sent-items-<subject_id>`.
pub fn sent_key(subject_id: u64) -> String {
    format!("{}-{}", SENT_PREFIX, subject_id)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CursorRecord {
    id: u64,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SentMarker {
    sent_at: DateTime<Utc>,
    /// Kind that claimed the subject
    #[serde(default)]
    kind: Option<NotificationKind>,
}

/// Engine state: the traversal cursor and the sent-notification markers.
#[derive(Clone)]
pub struct StateStore {
    store: Arc<dyn KvStore>,
}

impl StateStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Highest id fully scanned by a completed run. `None` before the first run.
    pub async fn cursor(&self) -> Result<Option<u64>> {
        let record: Option<CursorRecord> = read_json(self.store.as_ref(), CURSOR_KEY).await?;
        Ok(record.map(|r| r.id).filter(|&id| id > 0))
    }

    pub async fn set_cursor(&self, id: u64) -> Result<()> {
        let record = CursorRecord {
            id,
            updated_at: Some(Utc::now()),
        };
        write_json(self.store.as_ref(), CURSOR_KEY, &record).await
    }

    /// Presence test for the subject's marker.
    pub async fn already_sent(&self, subject_id: u64) -> Result<bool> {
        Ok(self.store.get(&sent_key(subject_id)).await?.is_some())
    }

    /// Unconditional upsert of the subject's marker.
    pub async fn mark_sent(&self, subject_id: u64, kind: NotificationKind) -> Result<()> {
        let marker = SentMarker {
            sent_at: Utc::now(),
            kind: Some(kind),
        };
        write_json(self.store.as_ref(), &sent_key(subject_id), &marker).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;
    use crate::storage::MemoryStorage;

    fn state() -> (Arc<MemoryStorage>, StateStore) {
        let mem = Arc::new(MemoryStorage::new());
        let state = StateStore::new(mem.clone());
        (mem, state)
    }

    #[tokio::test]
    async fn test_cursor_absent_then_set() {
        let (_, state) = state();
        assert_eq!(state.cursor().await.unwrap(), None);

        state.set_cursor(5000).await.unwrap();
        assert_eq!(state.cursor().await.unwrap(), Some(5000));
    }

    #[tokio::test]
    async fn test_zero_cursor_means_first_run() {
        let (mem, state) = state();
        mem.put(CURSOR_KEY, br#"{"id":0}"#).await.unwrap();
        assert_eq!(state.cursor().await.unwrap(), None);
    }

    #[test]
    fn test_sent_key_format() {
        assert_eq!(sent_key(4500), "sent-items-4500");
    }

    #[tokio::test]
    async fn test_marker_lifecycle() {
        let (mem, state) = state();

        assert!(!state.already_sent(42).await.unwrap());
        state
            .mark_sent(42, NotificationKind::UserComment)
            .await
            .unwrap();
        assert!(state.already_sent(42).await.unwrap());
        assert!(!state.already_sent(43).await.unwrap());

        // Any kind on the same subject hits the same marker
        state
            .mark_sent(42, NotificationKind::CommentKeywords)
            .await
            .unwrap();
        assert_eq!(mem.keys().await, vec!["sent-items-42"]);
    }

    #[tokio::test]
    async fn test_marker_records_kind() {
        let (mem, state) = state();
        state
            .mark_sent(7, NotificationKind::ReplyToUserStory)
            .await
            .unwrap();

        let bytes = mem.get("sent-items-7").await.unwrap().unwrap();
        let marker: SentMarker = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(marker.kind, Some(NotificationKind::ReplyToUserStory));
    }

    #[tokio::test]
    async fn test_bare_marker_still_counts() {
        let (mem, state) = state();
        mem.put("sent-items-9", b"{}").await.unwrap();
        assert!(state.already_sent(9).await.unwrap());
    }
}
