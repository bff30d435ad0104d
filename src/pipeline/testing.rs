//! In-memory collaborators for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Item, ItemKind};
use crate::services::{ItemSource, Notifier};
use crate::storage::state::SENT_PREFIX;
use crate::storage::{KvStore, MemoryStorage};

pub fn story(id: u64, by: &str, title: &str) -> Item {
    Item {
        id,
        kind: ItemKind::Story,
        by: Some(by.to_string()),
        title: Some(title.to_string()),
        time: 1_700_000_000,
        ..Item::default()
    }
}

pub fn comment(id: u64, parent: u64, by: &str, text: &str) -> Item {
    Item {
        id,
        kind: ItemKind::Comment,
        by: Some(by.to_string()),
        text: Some(text.to_string()),
        parent: Some(parent),
        time: 1_700_000_000,
        ..Item::default()
    }
}

/// Item store backed by a map. Unknown ids are "not found".
#[derive(Default)]
pub struct FakeSource {
    items: HashMap<u64, Item>,
    failing: HashSet<u64>,
    max_id: u64,
    max_id_fails: bool,
    fetched: Mutex<Vec<u64>>,
}

impl FakeSource {
    pub fn new(max_id: u64) -> Self {
        Self {
            max_id,
            ..Self::default()
        }
    }

    pub fn with(mut self, item: Item) -> Self {
        self.items.insert(item.id, item);
        self
    }

    pub fn failing(mut self, id: u64) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn max_id_fails(mut self) -> Self {
        self.max_id_fails = true;
        self
    }

    /// Direct lookup that is not recorded as a fetch.
    pub fn item(&self, id: u64) -> Item {
        self.items[&id].clone()
    }

    /// Ids requested through `get_item`, in order.
    pub fn fetched(&self) -> Vec<u64> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItemSource for FakeSource {
    async fn get_item(&self, id: u64) -> Result<Option<Item>> {
        self.fetched.lock().unwrap().push(id);
        if self.failing.contains(&id) {
            return Err(AppError::api(format!("item/{id}"), "connection reset"));
        }
        Ok(self.items.get(&id).cloned())
    }

    async fn max_item_id(&self) -> Result<u64> {
        if self.max_id_fails {
            return Err(AppError::api("maxitem", "unavailable"));
        }
        Ok(self.max_id)
    }
}

/// Records every message; can be switched to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::notify("non-ok response: invalid_token"));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Store whose reads and/or writes always fail.
pub struct FailingStore {
    pub fail_reads: bool,
    pub fail_writes: bool,
}

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_reads {
            return Err(AppError::storage(format!("read {key}: access denied")));
        }
        Ok(None)
    }

    async fn put(&self, key: &str, _value: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(AppError::storage(format!("write {key}: access denied")));
        }
        Ok(())
    }
}

/// Memory store that can fail dedup marker reads or writes. Every
/// successful `put` key is recorded in order.
#[derive(Default)]
pub struct MarkerStore {
    pub(crate) inner: MemoryStorage,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub(crate) puts: Mutex<Vec<String>>,
}

impl MarkerStore {
    pub fn puts(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl KvStore for MarkerStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_reads && key.starts_with(SENT_PREFIX) {
            return Err(AppError::storage(format!("read {key}: throttled")));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes && key.starts_with(SENT_PREFIX) {
            return Err(AppError::storage(format!("write {key}: throttled")));
        }
        self.inner.put(key, value).await?;
        self.puts.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
