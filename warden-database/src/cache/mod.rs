mod redis_store;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use redis_store::RedisCacheStore;

/// Guild settings change rarely and every write invalidates the key.
pub const CONFIG_CACHE_TTL: Duration = Duration::from_secs(10 * 60);
pub const CONTAINER_LIST_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

pub fn thread_settings_key(cache: &CacheService, guild_id: u64) -> String {
    cache.key(format!("thread_settings:{guild_id}"))
}

pub fn containers_key(cache: &CacheService, guild_id: u64) -> String {
    cache.key(format!("containers:{guild_id}"))
}

pub async fn invalidate_thread_settings(cache: &CacheService, guild_id: u64) -> anyhow::Result<()> {
    cache.del(&thread_settings_key(cache, guild_id)).await
}

pub async fn invalidate_containers(cache: &CacheService, guild_id: u64) -> anyhow::Result<()> {
    cache.del(&containers_key(cache, guild_id)).await
}

/// Without Redis every read misses and writes are dropped, so callers
/// always fall through to SQLite.
#[derive(Clone, Debug)]
enum CacheBackend {
    Disabled,
    Redis(RedisCacheStore),
}

#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    backend: CacheBackend,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Disabled,
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Redis(RedisCacheStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, CacheBackend::Redis(_))
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.ping().await,
        }
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    pub async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let CacheBackend::Redis(store) = &self.backend else {
            return Ok(None);
        };

        let Some(bytes) = store.get(key).await? else {
            return Ok(None);
        };

        let parsed = serde_json::from_slice(&bytes)
            .map_err(|e| anyhow::anyhow!("failed to deserialize cache value for `{key}`: {e}"))?;
        Ok(Some(parsed))
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let CacheBackend::Redis(store) = &self.backend else {
            return Ok(());
        };

        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow::anyhow!("failed to serialize cache value for `{key}`: {e}"))?;
        store.set(key, payload, ttl.as_secs().max(1)).await
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.del(key).await,
        }
    }

    pub async fn get_or_load_json<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self.get_json::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!(
                ?e,
                cache_key = key,
                "cache get failed; falling back to database"
            ),
        }

        let loaded = loader().await?;

        if let Err(e) = self.set_json(key, &loaded, ttl).await {
            warn!(
                ?e,
                cache_key = key,
                "cache set failed; returning database value"
            );
        }

        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CacheService, containers_key, thread_settings_key};

    #[test]
    fn keys_are_prefixed() {
        let cache = CacheService::disabled("threadwarden:test");
        assert_eq!(
            thread_settings_key(&cache, 42),
            "threadwarden:test:thread_settings:42"
        );
        assert_eq!(containers_key(&cache, 7), "threadwarden:test:containers:7");
    }

    #[tokio::test]
    async fn disabled_cache_always_loads() {
        let cache = CacheService::disabled("threadwarden:test");
        let key = cache.key("value");

        let first: u64 = cache
            .get_or_load_json(&key, Duration::from_secs(60), || async { Ok(1) })
            .await
            .expect("first load");
        let second: u64 = cache
            .get_or_load_json(&key, Duration::from_secs(60), || async { Ok(2) })
            .await
            .expect("second load");

        assert_eq!((first, second), (1, 2));
        assert!(!cache.is_redis_enabled());
    }
}
