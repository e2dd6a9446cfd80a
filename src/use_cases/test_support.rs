use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::entities::LinkEntry;
use crate::domain::ports::{Clock, CodeGenerator, IdentityLinker, LinkStore, PortError};

pub(crate) type LinkTable = Arc<Mutex<HashMap<String, LinkEntry>>>;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub put: bool,
    pub take: bool,
    pub purge: bool,
}

#[derive(Clone)]
pub(crate) struct RecordingStore {
    entries: LinkTable,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn insert_test_entry(&self, code: impl Into<String>, entry: LinkEntry) {
        let mut guard = self.entries.lock().expect("entries mutex poisoned");
        guard.insert(code.into(), entry);
    }

    pub(crate) fn insert_test_code(&self, code: impl Into<String>, player_id: &str) {
        self.insert_test_entry(
            code,
            LinkEntry {
                player_id: player_id.to_string(),
                issued_at: 0,
                expires_at: None,
            },
        );
    }

    pub(crate) fn get_test_entry(&self, code: &str) -> Option<LinkEntry> {
        let guard = self.entries.lock().expect("entries mutex poisoned");
        guard.get(code).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().expect("entries mutex poisoned").len()
    }
}

#[async_trait]
impl LinkStore for RecordingStore {
    async fn put(&self, code: String, entry: LinkEntry) -> Result<(), String> {
        if self.failures.put {
            return Err("put failed".to_string());
        }

        let mut guard = self.entries.lock().expect("entries mutex poisoned");
        guard.insert(code, entry);
        Ok(())
    }

    async fn insert_if_absent(&self, code: String, entry: LinkEntry) -> Result<bool, String> {
        if self.failures.put {
            return Err("put failed".to_string());
        }

        let mut guard = self.entries.lock().expect("entries mutex poisoned");
        if guard.contains_key(&code) {
            return Ok(false);
        }
        guard.insert(code, entry);
        Ok(true)
    }

    async fn take(&self, code: &str) -> Result<Option<LinkEntry>, String> {
        if self.failures.take {
            return Err("take failed".to_string());
        }

        let mut guard = self.entries.lock().expect("entries mutex poisoned");
        Ok(guard.remove(code))
    }

    async fn purge_expired(&self, now: u64) -> Result<usize, String> {
        if self.failures.purge {
            return Err("purge failed".to_string());
        }

        let mut guard = self.entries.lock().expect("entries mutex poisoned");
        let before = guard.len();
        guard.retain(|_, entry| !entry.is_expired(now));
        Ok(before - guard.len())
    }
}

// Linker fake that records every (chat user, player) pair it was asked to bind.
#[derive(Clone, Default)]
pub(crate) struct RecordingLinker {
    calls: Arc<Mutex<Vec<(String, String)>>>,
    should_fail: bool,
}

impl RecordingLinker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl IdentityLinker for RecordingLinker {
    async fn link_chat_identity(
        &self,
        chat_user_id: &str,
        player_id: &str,
    ) -> Result<(), PortError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push((chat_user_id.to_string(), player_id.to_string()));
        if self.should_fail {
            return Err("upstream rejected link".into());
        }
        Ok(())
    }
}

// Generator that replays a fixed list of codes, for collision tests.
pub(crate) struct SequenceGenerator {
    codes: Mutex<VecDeque<String>>,
}

impl SequenceGenerator {
    pub(crate) fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|code| code.to_string()).collect()),
        }
    }
}

impl CodeGenerator for SequenceGenerator {
    fn generate(&self) -> String {
        self.codes
            .lock()
            .expect("codes mutex poisoned")
            .pop_front()
            .expect("sequence generator ran out of codes")
    }
}
