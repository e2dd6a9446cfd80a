use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::domain::entities::LinkEntry;
use crate::domain::ports::{Clock, LinkStore};

pub type LinkTable = Arc<Mutex<HashMap<String, LinkEntry>>>;

// Application state shared by the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    // Outstanding link codes; the chat gateway holds a clone of the same table.
    pub link_codes: LinkTable,
    pub code_ttl: Option<Duration>,
}

impl AppState {
    pub fn new(code_ttl: Option<Duration>) -> Self {
        Self {
            link_codes: Arc::new(Mutex::new(HashMap::new())),
            code_ttl,
        }
    }

    pub fn link_store(&self) -> InMemoryLinkStore {
        InMemoryLinkStore {
            entries: self.link_codes.clone(),
        }
    }
}

// In-memory link code store. Every operation runs under one lock acquisition.
#[derive(Clone)]
pub struct InMemoryLinkStore {
    pub entries: LinkTable,
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn put(&self, code: String, entry: LinkEntry) -> Result<(), String> {
        let mut entries = self.entries.lock().await;
        entries.insert(code, entry);
        Ok(())
    }

    async fn insert_if_absent(&self, code: String, entry: LinkEntry) -> Result<bool, String> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&code) {
            return Ok(false);
        }
        entries.insert(code, entry);
        Ok(true)
    }

    async fn take(&self, code: &str) -> Result<Option<LinkEntry>, String> {
        let mut entries = self.entries.lock().await;
        Ok(entries.remove(code))
    }

    async fn purge_expired(&self, now: u64) -> Result<usize, String> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before - entries.len())
    }
}

// System clock adapter used by link use cases.
#[derive(Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
