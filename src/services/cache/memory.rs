//! In-memory `CacheClient` for unit tests.
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

#[derive(Default)]
pub(crate) struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Duration)>>,
    failing: AtomicBool,
}

impl MemoryCache {
    pub(crate) fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    pub(crate) fn put_raw(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            (value.to_string(), Duration::from_secs(60)),
        );
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::BackendConnection("connection refused".into()));
        }
        Ok(())
    }
}

// Only trailing-`*` globs; enough for tests.
fn matches(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => pattern == key,
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        self.check()?;
        Ok(self.entries.lock().unwrap().remove(key).map_or(0, |_| 1))
    }

    async fn del_matching(&self, pattern: &str) -> CacheResult<u64> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|k, _| !matches(pattern, k));
        Ok((before - entries.len()) as u64)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.check()?;
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn ping(&self) -> CacheResult<()> {
        self.check()
    }
}
