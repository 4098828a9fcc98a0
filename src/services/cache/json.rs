use std::{sync::Arc, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use tracing::error;

use crate::services::cache::client::{CacheClient, CacheResult, ttl_seconds};

pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Fail-open JSON helpers over a `CacheClient`.
///
/// Backend and decode errors are logged and degrade to a miss / no-op, so a
/// cache outage never fails the request that consulted it.
#[derive(Clone)]
pub struct JsonCache {
    client: Arc<dyn CacheClient>,
    default_ttl: Duration,
}

impl std::fmt::Debug for JsonCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonCache")
            .field("backend", &self.client.backend_name())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl JsonCache {
    pub fn new(client: Arc<dyn CacheClient>) -> Self {
        Self {
            client,
            default_ttl: ttl_seconds(DEFAULT_TTL_SECONDS),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.client.backend_name()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.client.get_string(key).await {
            Ok(v) => v?,
            Err(e) => {
                error!(key = %key, error = %e, "Cache get error");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| error!(key = %key, error = %e, "Cache value decode error"))
            .ok()
    }

    /// Store `value` with the default TTL (1 hour) unless `ttl` is given.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                error!(key = %key, error = %e, "Cache value encode error");
                return;
            }
        };

        let ttl = ttl.unwrap_or(self.default_ttl);
        if let Err(e) = self.client.set_with_ttl(key, &raw, ttl).await {
            error!(key = %key, error = %e, "Cache set error");
        }
    }

    pub async fn del(&self, key: &str) {
        if let Err(e) = self.client.del(key).await {
            error!(key = %key, error = %e, "Cache delete error");
        }
    }

    pub async fn del_pattern(&self, pattern: &str) {
        if let Err(e) = self.client.del_matching(pattern).await {
            error!(pattern = %pattern, error = %e, "Cache delete pattern error");
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.client
            .exists(key)
            .await
            .inspect_err(|e| error!(key = %key, error = %e, "Cache exists error"))
            .unwrap_or(false)
    }

    /// Raw reachability probe. Unlike the helpers above, errors are returned.
    pub async fn ping(&self) -> CacheResult<()> {
        self.client.ping().await
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::services::cache::memory::MemoryCache;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: String,
        graduation_year: u16,
    }

    fn cache() -> (JsonCache, Arc<MemoryCache>) {
        let mem = Arc::new(MemoryCache::default());
        (JsonCache::new(mem.clone()), mem)
    }

    #[tokio::test]
    async fn set_then_get() {
        let (cache, mem) = cache();
        let p = Profile {
            id: "u1".into(),
            graduation_year: 2019,
        };

        cache.set("profile:u1", &p, None).await;

        assert_eq!(cache.get::<Profile>("profile:u1").await, Some(p));
        assert_eq!(
            mem.ttl_of("profile:u1"),
            Some(Duration::from_secs(DEFAULT_TTL_SECONDS))
        );
        assert!(cache.exists("profile:u1").await);
    }

    #[tokio::test]
    async fn explicit_ttl_wins() {
        let (cache, mem) = cache();

        cache
            .set("k", &42u32, Some(Duration::from_secs(60)))
            .await;

        assert_eq!(mem.ttl_of("k"), Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn undecodable_value_is_a_miss() {
        let (cache, mem) = cache();
        mem.put_raw("profile:u1", "{not json");

        assert_eq!(cache.get::<Profile>("profile:u1").await, None);
    }

    #[tokio::test]
    async fn del_and_del_pattern() {
        let (cache, _) = cache();
        for key in ["user:1", "user:2", "post:1"] {
            cache.set(key, &1u8, None).await;
        }

        cache.del("post:1").await;
        assert!(!cache.exists("post:1").await);

        cache.del_pattern("user:*").await;
        assert!(!cache.exists("user:1").await);
        assert!(!cache.exists("user:2").await);
    }

    #[tokio::test]
    async fn backend_failure_fails_open() {
        let (cache, mem) = cache();
        cache.set("k", &1u8, None).await;
        mem.set_failing(true);

        assert_eq!(cache.get::<u8>("k").await, None);
        assert!(!cache.exists("k").await);
        cache.set("k", &2u8, None).await;
        cache.del("k").await;
        cache.del_pattern("*").await;
        assert!(cache.ping().await.is_err());

        mem.set_failing(false);
        assert_eq!(cache.get::<u8>("k").await, Some(1));
    }
}
