//! API Handlers
//!
//! HTTP request handlers for the health and cache status checks.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::error::Result;
use crate::models::{CacheHealth, CacheStatusResponse, HealthResponse};

const CHECK_KEY: &str = "health_check";
const CHECK_VALUE: &str = "ok";
const CHECK_TTL_SECS: u64 = 10;

/// Application state shared across all handlers.
///
/// Holds the one backend chosen at startup; handlers only see the contract.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn Cache>,
}

impl AppState {
    /// Creates a new AppState around the given backend.
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }
}

/// Handler for GET /health
///
/// Reports liveness of the process together with the backend's identity,
/// reachability and capabilities.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = &state.cache;
    Json(HealthResponse::ok(CacheHealth {
        connected: cache.is_connected().await,
        provider: cache.provider_name().to_string(),
        capabilities: cache.capabilities(),
    }))
}

/// Handler for GET /cache/status
///
/// Round-trips a short-lived check key through the backend. Always answers
/// 200; failures are reported in the body.
pub async fn cache_status_handler(State(state): State<AppState>) -> Json<CacheStatusResponse> {
    let cache = state.cache.as_ref();
    if !cache.is_connected().await {
        return Json(CacheStatusResponse::disconnected());
    }

    match round_trip(cache).await {
        Ok(passed) => {
            debug!(passed, provider = cache.provider_name(), "Cache check finished");
            Json(CacheStatusResponse::connected(passed))
        }
        Err(e) => {
            warn!(error = %e, provider = cache.provider_name(), "Cache check failed");
            Json(CacheStatusResponse::error(e.to_string()))
        }
    }
}

async fn round_trip(cache: &dyn Cache) -> Result<bool> {
    cache.set(CHECK_KEY, CHECK_VALUE, Some(CHECK_TTL_SECS)).await?;
    let value = cache.get(CHECK_KEY).await?;
    cache.del(CHECK_KEY).await?;
    Ok(value.as_deref() == Some(CHECK_VALUE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryCache, Ttl};
    use crate::error::CacheError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Reports itself connected but fails every command.
    #[derive(Debug)]
    struct BrokenCache;

    fn broken(op: &'static str, key: &str) -> CacheError {
        CacheError::operation(op, key, "connection reset")
    }

    #[async_trait]
    impl Cache for BrokenCache {
        async fn set(&self, key: &str, _value: &str, _ttl: Option<u64>) -> Result<()> {
            Err(broken("set", key))
        }
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Err(broken("get", key))
        }
        async fn del(&self, key: &str) -> Result<()> {
            Err(broken("del", key))
        }
        async fn exists(&self, key: &str) -> Result<bool> {
            Err(broken("exists", key))
        }
        async fn ttl(&self, key: &str) -> Result<Ttl> {
            Err(broken("ttl", key))
        }
        async fn expire(&self, key: &str, _seconds: u64) -> Result<()> {
            Err(broken("expire", key))
        }
        async fn mget(&self, _keys: &[&str]) -> Result<Vec<Option<String>>> {
            Err(broken("mget", "*"))
        }
        async fn mset(&self, _entries: &HashMap<String, String>) -> Result<()> {
            Err(broken("mset", "*"))
        }
        async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
            Err(broken("keys", pattern))
        }
        async fn is_connected(&self) -> bool {
            true
        }
        async fn disconnect(&self) -> Result<()> {
            Ok(())
        }
        fn provider_name(&self) -> &'static str {
            "broken"
        }
    }

    fn memory_state() -> AppState {
        AppState::new(Arc::new(InMemoryCache::new()))
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(memory_state())).await;
        assert_eq!(response.status, "ok");
        assert!(response.cache.connected);
        assert_eq!(response.cache.provider, "memory");
        assert!(!response.cache.capabilities.sorted_sets);
    }

    #[tokio::test]
    async fn test_cache_status_passes_and_cleans_up() {
        let state = memory_state();
        let response = cache_status_handler(State(state.clone())).await;
        assert_eq!(response.status, "connected");
        assert_eq!(response.test.as_deref(), Some("passed"));
        assert!(!state.cache.exists(CHECK_KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_status_after_disconnect() {
        let state = memory_state();
        state.cache.disconnect().await.unwrap();
        let response = cache_status_handler(State(state)).await;
        // The in-memory backend stays usable after disconnect
        assert_eq!(response.status, "connected");
    }

    #[tokio::test]
    async fn test_cache_status_reports_errors() {
        let state = AppState::new(Arc::new(BrokenCache));
        let response = cache_status_handler(State(state)).await;
        assert_eq!(response.status, "error");
        assert!(response.test.is_none());
        assert!(response.error.as_deref().unwrap().contains("connection reset"));
    }
}
