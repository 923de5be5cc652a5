//! Caching fetch client.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use ffwrapped_core::{AppConfig, Envelope, Error, FetchError, Fetched, ResponseCache, SessionDb, SessionStore};

use super::classify::request;
use super::descriptor::RequestDescriptor;
use super::inflight::InFlight;
use crate::transport::{ReqwestTransport, Transport};

/// Fetch client that serves and populates a two-tier [`ResponseCache`].
///
/// Cloning is cheap and shares the transport, the cache and the in-flight
/// table, so one client can be handed to every caller.
#[derive(Clone)]
pub struct CachingFetchClient {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    inflight: Option<Arc<InFlight>>,
}

impl std::fmt::Debug for CachingFetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingFetchClient")
            .field("cache", &self.cache)
            .field("coalescing", &self.inflight.is_some())
            .finish_non_exhaustive()
    }
}

impl CachingFetchClient {
    /// Create a client with in-flight coalescing enabled.
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<ResponseCache>) -> Self {
        Self { transport, cache, inflight: Some(Arc::new(InFlight::default())) }
    }

    /// Turn per-key coalescing on or off. Off, concurrent fetches of an
    /// uncached key each perform their own network call.
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.inflight = enabled.then(|| self.inflight.take().unwrap_or_default());
        self
    }

    /// Build the production client: reqwest transport plus a SQLite session
    /// store at `store_path`, or in memory when none is configured.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let transport = ReqwestTransport::from_config(config)?;

        let store: Arc<dyn SessionStore> = match &config.store_path {
            Some(path) => Arc::new(SessionDb::open(path).await?),
            None => Arc::new(SessionDb::open_in_memory().await?),
        };
        let cache = ResponseCache::new(store, config.storage_prefix.clone());

        Ok(Self::new(Arc::new(transport), Arc::new(cache)).with_coalescing(config.coalesce_in_flight))
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Serve `descriptor` from cache, or perform one network call and cache
    /// a successful body. Errors are returned in the envelope, never cached.
    pub async fn fetch(&self, descriptor: &RequestDescriptor) -> Envelope {
        let key = descriptor.cache_key();

        if let Some(hit) = self.cache.get(&key).await {
            return Envelope::cached(hit);
        }

        let Some(inflight) = &self.inflight else {
            return self.fetch_live(&key, descriptor).await;
        };

        let _turn = inflight.acquire(&key).await;
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(key, "served by a concurrent fetch");
            return Envelope::cached(hit);
        }

        self.fetch_live(&key, descriptor).await
    }

    async fn fetch_live(&self, key: &str, descriptor: &RequestDescriptor) -> Envelope {
        let start = Instant::now();

        match request(self.transport.as_ref(), descriptor).await {
            Ok(body) => {
                let body = Arc::new(body);
                self.cache.set(key, Arc::clone(&body)).await;
                tracing::debug!(
                    url = descriptor.url(),
                    key,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "fetched and cached"
                );
                Envelope::fresh(body)
            }
            Err(err) => {
                tracing::debug!(url = descriptor.url(), kind = ?err.kind(), error = %err, "fetch failed");
                Envelope::Error(err)
            }
        }
    }

    /// [`fetch`](Self::fetch), then decode the body into `T`.
    ///
    /// A body that does not match `T` yields [`FetchError::Decode`]; the
    /// cached value is left as is.
    pub async fn fetch_as<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<Fetched<T>, FetchError> {
        let envelope = self.fetch(descriptor).await;
        let from_cache = envelope.from_cache();
        let body = envelope.into_result()?;

        let value = T::deserialize(body.as_ref())
            .map_err(|e| FetchError::Decode { url: descriptor.url().to_string(), detail: e.to_string() })?;

        Ok(Fetched { value, from_cache })
    }

    /// Warm the cache for `descriptor` in the background.
    ///
    /// Returns `None` without spawning when the memory tier already holds the
    /// key, or when no tokio runtime is running. Otherwise the fetch runs on a
    /// spawned task; its outcome is only logged. The handle may be dropped,
    /// and awaiting it never yields a fetch error.
    pub fn preload(&self, descriptor: RequestDescriptor) -> Option<JoinHandle<()>> {
        let key = descriptor.cache_key();
        if self.cache.get_fast(&key).is_some() {
            tracing::debug!(key, "preload skipped, already cached");
            return None;
        }

        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(url = descriptor.url(), "preload skipped, no tokio runtime");
            return None;
        };

        let client = self.clone();
        Some(runtime.spawn(async move {
            if let Envelope::Error(err) = client.fetch(&descriptor).await {
                tracing::debug!(url = descriptor.url(), error = %err, "preload failed, discarded");
            }
        }))
    }

    /// Empty both cache tiers.
    pub async fn clear(&self) {
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{RawRequest, RawResponse, TransportError};
    use async_trait::async_trait;
    use ffwrapped_core::FetchErrorKind;
    use ffwrapped_core::cache::MemorySessionStore;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const URL: &str = "http://localhost:5001/api/league/7/info?year=2024";

    /// Counts calls and answers every request with the same canned outcome.
    struct Spy {
        calls: AtomicUsize,
        reply: Result<RawResponse, TransportError>,
        delay: Duration,
    }

    impl Spy {
        fn new(reply: Result<RawResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), reply, delay: Duration::ZERO })
        }

        fn slow(reply: Result<RawResponse, TransportError>, delay: Duration) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), reply, delay })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for Spy {
        async fn send(&self, _request: &RawRequest) -> Result<RawResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply.clone()
        }
    }

    fn ok_42() -> Result<RawResponse, TransportError> {
        Ok(RawResponse::json(200, &json!({"value": 42})))
    }

    fn client(spy: &Arc<Spy>) -> CachingFetchClient {
        CachingFetchClient::new(spy.clone(), Arc::new(ResponseCache::in_memory()))
    }

    #[tokio::test]
    async fn test_success_then_cached_without_transport() {
        let spy = Spy::new(ok_42());
        let client = client(&spy);
        let d = RequestDescriptor::get(URL);

        let first = client.fetch(&d).await;
        assert_eq!(first.data().unwrap()["value"], 42);
        assert!(first.error().is_none());
        assert!(!first.from_cache());

        let second = client.fetch(&d).await;
        assert!(second.from_cache());
        assert!(Arc::ptr_eq(first.data().unwrap(), second.data().unwrap()));
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn test_same_path_other_host_hits_cache() {
        let spy = Spy::new(ok_42());
        let client = client(&spy);

        client.fetch(&RequestDescriptor::get("http://host/a/b?x=1")).await;
        let env = client.fetch(&RequestDescriptor::get("https://otherhost/a/b?x=1")).await;

        assert!(env.from_cache());
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let spy = Spy::new(ok_42());
        let client = client(&spy);
        let d = RequestDescriptor::get(URL);

        client.fetch(&d).await;
        client.clear().await;
        let env = client.fetch(&d).await;

        assert!(!env.from_cache());
        assert_eq!(spy.calls(), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let spy = Spy::new(Ok(RawResponse::json(404, &json!({"error": "not found"}))));
        let client = client(&spy);
        let d = RequestDescriptor::get(URL);

        let env = client.fetch(&d).await;
        assert!(env.data().is_none());
        assert!(env.error().unwrap().to_string().contains("not found"));

        client.fetch(&d).await;
        assert_eq!(spy.calls(), 2);
        assert_eq!(client.cache().memory_len(), 0);
    }

    #[tokio::test]
    async fn test_transport_rejection_names_url() {
        let spy = Spy::new(Err(TransportError::Network("dns failure".into())));
        let env = client(&spy).fetch(&RequestDescriptor::get(URL)).await;

        let err = env.error().unwrap();
        assert_eq!(err.kind(), FetchErrorKind::Transport);
        assert!(err.to_string().contains(URL));
        assert!(env.data().is_none());
    }

    #[tokio::test]
    async fn test_html_fallback_page() {
        let spy = Spy::new(Ok(RawResponse::new(200, Some("text/html"), "<html></html>")));
        let env = client(&spy).fetch(&RequestDescriptor::get(URL)).await;

        let err = env.error().unwrap();
        assert_eq!(err.kind(), FetchErrorKind::WrongContentType);
        assert!(err.to_string().contains("200"));
        assert!(err.to_string().contains("text/html"));
        assert!(env.data().is_none());
    }

    #[tokio::test]
    async fn test_session_tier_hit_promotes_without_transport() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .set_item(&format!("ffw_{}", ffwrapped_core::cache_key(URL)), r#"{"value":9}"#)
            .await
            .unwrap();
        let spy = Spy::new(ok_42());
        let client = CachingFetchClient::new(spy.clone(), Arc::new(ResponseCache::new(store, "ffw_")));

        let env = client.fetch(&RequestDescriptor::get(URL)).await;

        assert!(env.from_cache());
        assert_eq!(env.data().unwrap()["value"], 9);
        assert_eq!(spy.calls(), 0);
        assert_eq!(client.cache().memory_len(), 1);
    }

    #[tokio::test]
    async fn test_preload_cached_key_is_noop() {
        let spy = Spy::new(ok_42());
        let client = client(&spy);
        let d = RequestDescriptor::get(URL);
        client.fetch(&d).await;

        assert!(client.preload(d).is_none());
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn test_preload_session_only_key_no_transport() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .set_item(&format!("ffw_{}", ffwrapped_core::cache_key(URL)), r#"{"value":9}"#)
            .await
            .unwrap();
        let spy = Spy::new(ok_42());
        let client = CachingFetchClient::new(spy.clone(), Arc::new(ResponseCache::new(store, "ffw_")));

        client.preload(RequestDescriptor::get(URL)).unwrap().await.unwrap();

        assert_eq!(spy.calls(), 0);
        assert_eq!(client.cache().get_fast(&ffwrapped_core::cache_key(URL)).unwrap()["value"], 9);
    }

    #[test]
    fn test_preload_outside_runtime_is_skipped() {
        let spy = Spy::new(ok_42());
        let client = client(&spy);

        assert!(client.preload(RequestDescriptor::get(URL)).is_none());
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn test_null_body_is_error_and_not_cached() {
        let spy = Spy::new(Ok(RawResponse::new(200, Some("application/json"), "null")));
        let client = client(&spy);
        let d = RequestDescriptor::get(URL);

        let env = client.fetch(&d).await;
        assert!(env.data().is_none());
        assert_eq!(env.error().unwrap().kind(), FetchErrorKind::Parse);

        let json = serde_json::to_value(&env).unwrap();
        assert!(!(json["data"].is_null() && json["error"].is_null()));

        assert_eq!(client.cache().memory_len(), 0);
        client.fetch(&d).await;
        assert_eq!(spy.calls(), 2);
    }

    #[tokio::test]
    async fn test_preload_populates_cache() {
        let spy = Spy::new(ok_42());
        let client = client(&spy);
        let d = RequestDescriptor::get(URL);

        client.preload(d.clone()).unwrap().await.unwrap();
        let env = client.fetch(&d).await;

        assert!(env.from_cache());
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn test_preload_failure_is_silent() {
        let spy = Spy::new(Err(TransportError::Timeout));
        let client = client(&spy);

        let handle = client.preload(RequestDescriptor::get(URL)).unwrap();
        assert!(handle.await.is_ok());
        assert_eq!(spy.calls(), 1);
        assert_eq!(client.cache().memory_len(), 0);
    }

    #[derive(Debug, Deserialize)]
    struct Answer {
        value: u32,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Other {
        teams: Vec<String>,
    }

    #[tokio::test]
    async fn test_fetch_as_decodes() {
        let spy = Spy::new(ok_42());
        let client = client(&spy);
        let d = RequestDescriptor::get(URL);

        let first: Fetched<Answer> = client.fetch_as(&d).await.unwrap();
        assert_eq!(first.value.value, 42);
        assert!(!first.from_cache);

        let second: Fetched<Answer> = client.fetch_as(&d).await.unwrap();
        assert!(second.from_cache);
    }

    #[tokio::test]
    async fn test_fetch_as_schema_mismatch() {
        let spy = Spy::new(ok_42());
        let client = client(&spy);

        let err = client.fetch_as::<Other>(&RequestDescriptor::get(URL)).await.unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Decode);
        assert!(err.to_string().contains(URL));
        assert_eq!(client.cache().memory_len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_coalesce() {
        let spy = Spy::slow(ok_42(), Duration::from_millis(50));
        let client = client(&spy);
        let d = RequestDescriptor::get(URL);

        let (a, b, c) = tokio::join!(client.fetch(&d), client.fetch(&d), client.fetch(&d));

        assert_eq!(spy.calls(), 1);
        assert_eq!([a.from_cache(), b.from_cache(), c.from_cache()].iter().filter(|x| **x).count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_without_coalescing() {
        let spy = Spy::slow(ok_42(), Duration::from_millis(50));
        let client = client(&spy).with_coalescing(false);
        let d = RequestDescriptor::get(URL);

        let (a, b) = tokio::join!(client.fetch(&d), client.fetch(&d));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(spy.calls(), 2);
    }
}
