//! Two-tier response cache.
//!
//! Lookups hit the in-memory tier first, then the durable [`SessionStore`].
//! A durable hit is promoted into memory. Writes go to both tiers. The store
//! is best-effort: any failure it reports is logged and treated as a miss
//! (reads) or skipped (writes and clears), never surfaced to the caller.
//! If a clear fails to reach the store, durable reads are bypassed until a
//! later clear succeeds, so entries from before the clear are never served.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::store::{MemorySessionStore, SessionStore};

/// Prefix applied to every durable key so unrelated stored data is left alone.
pub const DEFAULT_STORAGE_PREFIX: &str = "ffw_";

/// Cache of successful JSON response bodies, keyed by [`cache_key`](super::key::cache_key).
pub struct ResponseCache {
    memory: RwLock<HashMap<String, Arc<Value>>>,
    store: Arc<dyn SessionStore>,
    prefix: String,
    /// Set while the store may still hold entries a clear failed to remove.
    session_stale: AtomicBool,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("prefix", &self.prefix)
            .field("memory_entries", &self.memory_len())
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    pub fn new(store: Arc<dyn SessionStore>, prefix: impl Into<String>) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            store,
            prefix: prefix.into(),
            session_stale: AtomicBool::new(false),
        }
    }

    /// Cache whose durable tier lives only as long as this process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()), DEFAULT_STORAGE_PREFIX)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Fast-tier lookup only. Never suspends.
    pub fn get_fast(&self, key: &str) -> Option<Arc<Value>> {
        let memory = self.memory.read().unwrap_or_else(PoisonError::into_inner);
        memory.get(key).cloned()
    }

    pub fn memory_len(&self) -> usize {
        self.memory.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn put_fast(&self, key: &str, value: Arc<Value>) {
        let mut memory = self.memory.write().unwrap_or_else(PoisonError::into_inner);
        memory.insert(key.to_string(), value);
    }

    /// Look a key up in memory, then in the durable tier.
    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        if let Some(hit) = self.get_fast(key) {
            tracing::debug!(key, tier = "memory", "cache hit");
            return Some(hit);
        }

        if self.session_stale.load(Ordering::Acquire) {
            tracing::debug!(key, "session tier bypassed after failed clear");
            return None;
        }

        let stored = match self.store.get_item(&self.storage_key(key)).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "session store read failed; treating as cache miss");
                return None;
            }
        };

        match serde_json::from_str::<Value>(&stored) {
            Ok(value) => {
                let value = Arc::new(value);
                self.put_fast(key, Arc::clone(&value));
                tracing::debug!(key, tier = "session", "cache hit, promoted to memory");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "stored cache entry is not valid JSON; treating as cache miss");
                None
            }
        }
    }

    /// Store a body in both tiers.
    pub async fn set(&self, key: &str, value: Arc<Value>) {
        self.put_fast(key, Arc::clone(&value));

        let serialized = match serde_json::to_string(value.as_ref()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache entry; memory tier only");
                return;
            }
        };

        if let Err(e) = self.store.set_item(&self.storage_key(key), &serialized).await {
            tracing::warn!(key, error = %e, "session store write failed; memory tier only");
        }
    }

    /// Empty the memory tier and remove every prefixed durable entry.
    pub async fn clear(&self) {
        let dropped = {
            let mut memory = self.memory.write().unwrap_or_else(PoisonError::into_inner);
            let n = memory.len();
            memory.clear();
            n
        };

        match self.store.remove_prefixed(&self.prefix).await {
            Ok(removed) => {
                self.session_stale.store(false, Ordering::Release);
                tracing::debug!(memory = dropped, session = removed, "cache cleared");
            }
            Err(e) => {
                self.session_stale.store(true, Ordering::Release);
                tracing::warn!(error = %e, "session store clear failed; session reads disabled until next clear");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;
    use serde_json::json;

    struct BrokenStore;

    #[async_trait]
    impl SessionStore for BrokenStore {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, Error> {
            Err(Error::InvalidInput("storage disabled".into()))
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<(), Error> {
            Err(Error::InvalidInput("quota exceeded".into()))
        }

        async fn remove_prefixed(&self, _prefix: &str) -> Result<u64, Error> {
            Err(Error::InvalidInput("storage disabled".into()))
        }
    }

    /// Reads and writes work, removal always fails.
    #[derive(Default)]
    struct StickyStore {
        inner: MemorySessionStore,
        fail_removal: AtomicBool,
    }

    #[async_trait]
    impl SessionStore for StickyStore {
        async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
            self.inner.set_item(key, value).await
        }

        async fn remove_prefixed(&self, prefix: &str) -> Result<u64, Error> {
            if self.fail_removal.load(Ordering::SeqCst) {
                return Err(Error::InvalidInput("storage locked".into()));
            }
            self.inner.remove_prefixed(prefix).await
        }
    }

    #[tokio::test]
    async fn test_failed_clear_stops_serving_old_entries() {
        let store = Arc::new(StickyStore { fail_removal: AtomicBool::new(true), ..Default::default() });
        let cache = ResponseCache::new(store.clone(), "ffw_");
        cache.set("k", Arc::new(json!({"value": 1}))).await;

        cache.clear().await;
        assert!(store.inner.get_item("ffw_k").await.unwrap().is_some());
        assert!(cache.get("k").await.is_none());

        cache.set("k", Arc::new(json!({"value": 2}))).await;
        assert_eq!(cache.get("k").await.unwrap()["value"], 2);

        store.fail_removal.store(false, Ordering::SeqCst);
        cache.clear().await;
        store.inner.set_item("ffw_fresh", r#"{"value":3}"#).await.unwrap();
        assert_eq!(cache.get("fresh").await.unwrap()["value"], 3);
    }

    #[tokio::test]
    async fn test_set_writes_both_tiers() {
        let store = Arc::new(MemorySessionStore::new());
        let cache = ResponseCache::new(store.clone(), "ffw_");

        cache.set("_league_1", Arc::new(json!({"value": 42}))).await;

        assert!(cache.get_fast("_league_1").is_some());
        let stored = store.get_item("ffw__league_1").await.unwrap().unwrap();
        assert_eq!(serde_json::from_str::<Value>(&stored).unwrap(), json!({"value": 42}));
    }

    #[tokio::test]
    async fn test_memory_hit_returns_same_allocation() {
        let cache = ResponseCache::in_memory();
        let value = Arc::new(json!({"value": 42}));
        cache.set("k", Arc::clone(&value)).await;

        let hit = cache.get("k").await.unwrap();
        assert!(Arc::ptr_eq(&hit, &value));
    }

    #[tokio::test]
    async fn test_session_hit_promotes_to_memory() {
        let store = Arc::new(MemorySessionStore::new());
        store.set_item("ffw_k", r#"{"value":7}"#).await.unwrap();
        let cache = ResponseCache::new(store, "ffw_");

        assert!(cache.get_fast("k").is_none());
        let hit = cache.get("k").await.unwrap();
        assert_eq!(hit["value"], 7);
        assert!(cache.get_fast("k").is_some());
    }

    #[tokio::test]
    async fn test_corrupt_session_entry_is_miss() {
        let store = Arc::new(MemorySessionStore::new());
        store.set_item("ffw_k", "{not json").await.unwrap();
        let cache = ResponseCache::new(store, "ffw_");

        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.memory_len(), 0);
    }

    #[tokio::test]
    async fn test_broken_store_degrades_to_memory() {
        let cache = ResponseCache::new(Arc::new(BrokenStore), "ffw_");

        assert!(cache.get("k").await.is_none());
        cache.set("k", Arc::new(json!([1, 2, 3]))).await;
        assert_eq!(*cache.get("k").await.unwrap(), json!([1, 2, 3]));

        cache.clear().await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_leaves_foreign_keys() {
        let store = Arc::new(MemorySessionStore::new());
        store.set_item("theme", "dark").await.unwrap();
        let cache = ResponseCache::new(store.clone(), "ffw_");
        cache.set("a", Arc::new(json!(1))).await;
        cache.set("b", Arc::new(json!(2))).await;

        cache.clear().await;

        assert_eq!(cache.memory_len(), 0);
        assert!(cache.get("a").await.is_none());
        assert_eq!(store.get_item("theme").await.unwrap().as_deref(), Some("dark"));
        assert_eq!(store.len(), 1);
    }
}
