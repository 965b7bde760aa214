//! Backend Factory
//!
//! Turns a resolved [`BackendConfig`] into one live backend behind the
//! contract. Runs once at startup; never on the request path.

use std::sync::Arc;

use tracing::info;

use crate::cache::{Cache, InMemoryCache, RedisCache, UpstashCache};
use crate::config::{BackendConfig, BackendOptions, Config};
use crate::error::Result;

/// Builds the backend described by `backend`.
///
/// Performs no network I/O; invalid settings fail here, not on first use.
pub fn build_cache(backend: &BackendConfig, options: &BackendOptions) -> Result<Arc<dyn Cache>> {
    let cache: Arc<dyn Cache> = match backend {
        BackendConfig::Memory => Arc::new(InMemoryCache::with_sweep_interval(options.sweep_interval)),
        BackendConfig::Managed { url } => Arc::new(RedisCache::new(url)?),
        BackendConfig::Rest { url, token } => Arc::new(UpstashCache::with_timeout(
            url,
            token,
            options.request_timeout,
        )?),
    };

    info!(
        provider = backend.provider(),
        backend = cache.provider_name(),
        "Cache backend selected"
    );
    Ok(cache)
}

/// Resolves the backend from `config` and builds it.
pub fn create_cache(config: &Config) -> Result<Arc<dyn Cache>> {
    build_cache(&config.backend()?, &config.options)
}
