//! In-Memory Backend
//!
//! Process-local cache implementing the core contract only. No optional
//! capability group is provided.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::traits::check_set_ttl;
use crate::cache::{Cache, GlobPattern, MemoryStore, Ttl};
use crate::error::Result;
use crate::tasks::spawn_expiry_sweeper;

/// Default period of the background expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

// == In-Memory Cache ==
/// Map-backed cache with lazy expiry on reads and a periodic sweep.
///
/// The entry map and the expiry queue sit behind one mutex, so every mutation
/// and every sweep sees them in step.
#[derive(Debug)]
pub struct InMemoryCache {
    store: Arc<Mutex<MemoryStore>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl InMemoryCache {
    // == Constructor ==
    /// Creates an empty cache sweeping at [`DEFAULT_SWEEP_INTERVAL`].
    pub fn new() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }

    /// Creates an empty cache with a custom sweep period.
    ///
    /// Outside a tokio runtime no sweeper is started; reads still never
    /// return expired data.
    pub fn with_sweep_interval(interval: Duration) -> Self {
        let store = Arc::new(Mutex::new(MemoryStore::new()));

        let sweeper = match tokio::runtime::Handle::try_current() {
            Ok(_) => Some(spawn_expiry_sweeper(Arc::downgrade(&store), interval)),
            Err(_) => {
                debug!("No tokio runtime, in-memory cache relies on lazy expiry only");
                None
            }
        };

        info!("In-memory cache initialized");

        Self {
            store,
            sweeper: Mutex::new(sweeper),
        }
    }

    /// Number of stored entries, including expired ones not yet collected.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
        check_set_ttl(ttl_seconds)?;

        self.store
            .lock()
            .await
            .set(key, value.to_string(), ttl_seconds, current_timestamp_ms());

        debug!(key, ttl = ?ttl_seconds, "Set cache");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.store.lock().await.get(key, current_timestamp_ms());
        debug!(key, hit = value.is_some(), "Get cache");
        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.store.lock().await.delete(key);
        debug!(key, "Deleted cache");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.lock().await.exists(key, current_timestamp_ms()))
    }

    async fn ttl(&self, key: &str) -> Result<Ttl> {
        Ok(self.store.lock().await.ttl(key, current_timestamp_ms()))
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<()> {
        let applied = self
            .store
            .lock()
            .await
            .expire(key, ttl_seconds, current_timestamp_ms());

        debug!(key, ttl = ttl_seconds, applied, "Set expiry");
        Ok(())
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let now = current_timestamp_ms();
        let mut store = self.store.lock().await;
        Ok(keys.iter().map(|key| store.get(key, now)).collect())
    }

    async fn mset(&self, entries: &HashMap<String, String>) -> Result<()> {
        let now = current_timestamp_ms();
        let mut store = self.store.lock().await;
        for (key, value) in entries {
            store.set(key, value.clone(), None, now);
        }

        debug!(count = entries.len(), "Set multiple keys");
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let glob = GlobPattern::new(pattern)?;
        Ok(self.store.lock().await.keys(&glob, current_timestamp_ms()))
    }

    async fn is_connected(&self) -> bool {
        true
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(handle) = self.sweeper.lock().await.take() {
            handle.abort();
        }
        self.store.lock().await.clear();

        info!("In-memory cache cleared");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Capabilities;
    use crate::error::CacheError;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();

        cache.set("key1", "value1", None).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap(), Some("value1".to_string()));
        assert!(cache.exists("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_ttl_expiry_hides_key_everywhere() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", Some(1)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1200)).await;

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.exists("k").await.unwrap());
        assert!(cache.keys("*").await.unwrap().is_empty());
        assert_eq!(cache.ttl("k").await.unwrap(), Ttl::Missing);
    }

    #[tokio::test]
    async fn test_ttl_sentinels() {
        let cache = InMemoryCache::new();
        cache.set("plain", "v", None).await.unwrap();
        cache.set("timed", "v", Some(30)).await.unwrap();

        assert_eq!(cache.ttl("plain").await.unwrap(), Ttl::Persistent);
        assert_eq!(cache.ttl("nonexistent").await.unwrap(), Ttl::Missing);
        assert!(matches!(cache.ttl("timed").await.unwrap(), Ttl::Expires(29..=30)));
    }

    #[tokio::test]
    async fn test_set_zero_ttl_rejected() {
        let cache = InMemoryCache::new();
        let result = cache.set("k", "v", Some(0)).await;
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expire_missing_key_is_noop() {
        let cache = InMemoryCache::new();
        cache.expire("missing", 10).await.unwrap();
        assert!(!cache.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_del_twice() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", None).await.unwrap();

        cache.del("k").await.unwrap();
        cache.del("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mset_mget_alignment() {
        let cache = InMemoryCache::new();
        let entries = HashMap::from([
            ("x".to_string(), "1".to_string()),
            ("y".to_string(), "2".to_string()),
        ]);

        cache.mset(&entries).await.unwrap();

        let values = cache.mget(&["x", "y", "z"]).await.unwrap();
        assert_eq!(
            values,
            vec![Some("1".to_string()), Some("2".to_string()), None]
        );
        assert_eq!(cache.ttl("x").await.unwrap(), Ttl::Persistent);
    }

    #[tokio::test]
    async fn test_keys_pattern() {
        let cache = InMemoryCache::new();
        for key in ["a:1", "a:2", "b:1"] {
            cache.set(key, "v", None).await.unwrap();
        }

        let mut keys = cache.keys("a:*").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a:1", "a:2"]);
    }

    #[tokio::test]
    async fn test_no_optional_capabilities() {
        let cache = InMemoryCache::new();

        assert!(cache.hashes().is_none());
        assert!(cache.lists().is_none());
        assert!(cache.sets().is_none());
        assert!(cache.sorted_sets().is_none());
        assert_eq!(cache.capabilities(), Capabilities::default());
    }

    #[tokio::test]
    async fn test_disconnect_twice_and_reuse() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", Some(60)).await.unwrap();

        cache.disconnect().await.unwrap();
        cache.disconnect().await.unwrap();

        assert!(cache.is_connected().await);
        assert!(cache.is_empty().await);
        cache.set("k2", "v2", None).await.unwrap();
        assert_eq!(cache.get("k2").await.unwrap(), Some("v2".to_string()));
    }

    #[test]
    fn test_construction_outside_runtime() {
        let cache = InMemoryCache::new();
        tokio_test::block_on(async {
            cache.set("k", "v", None).await.unwrap();
            assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
            cache.disconnect().await.unwrap();
        });
    }

    async fn overwrite_hot_key(cache: &InMemoryCache, times: usize) -> usize {
        for i in 0..times {
            cache.set("hot", &format!("v{}", i), Some(3600)).await.unwrap();
        }
        cache.store.lock().await.pending_deadlines()
    }

    #[test]
    fn test_deadlines_bounded_without_sweeper() {
        let cache = InMemoryCache::new();
        assert!(cache.sweeper.try_lock().unwrap().is_none());

        let pending = tokio_test::block_on(overwrite_hot_key(&cache, 50_000));

        assert!(pending <= 4096, "pending deadlines grew to {}", pending);
    }

    #[tokio::test]
    async fn test_deadlines_bounded_after_disconnect() {
        let cache = InMemoryCache::new();
        cache.disconnect().await.unwrap();

        let pending = overwrite_hot_key(&cache, 50_000).await;

        assert!(pending <= 4096, "pending deadlines grew to {}", pending);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweeper_collects_without_reads() {
        let cache = InMemoryCache::with_sweep_interval(Duration::from_millis(50));
        cache.set("short", "v", Some(1)).await.unwrap();
        cache.set("long", "v", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1300)).await;

        assert_eq!(cache.len().await, 1);
    }
}
