//! Configuration Module
//!
//! Loads cache backend selection and server settings from environment
//! variables, and resolves them into exactly one backend configuration.

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_REDIS_URL;
use crate::error::{CacheError, Result};

// == Cache Settings ==
/// Raw backend settings as read from the environment. Nothing is validated
/// until [`BackendConfig::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSettings {
    /// Provider tag: `memory`, `managed`/`redis`, `rest`/`upstash`
    pub provider: Option<String>,
    /// Connection URL of the network store
    pub redis_url: Option<String>,
    /// Base URL of the REST store
    pub rest_url: Option<String>,
    /// Bearer token for the REST store
    pub rest_token: Option<String>,
}

impl CacheSettings {
    /// Reads settings from the environment.
    ///
    /// # Environment Variables
    /// - `CACHE_PROVIDER` - backend tag (optional)
    /// - `REDIS_URL` - network store URL (optional)
    /// - `UPSTASH_REDIS_REST_URL` - REST store URL (optional)
    /// - `UPSTASH_REDIS_REST_TOKEN` - REST store token (optional)
    pub fn from_env() -> Self {
        Self {
            provider: env_string("CACHE_PROVIDER"),
            redis_url: env_string("REDIS_URL"),
            rest_url: env_string("UPSTASH_REDIS_REST_URL"),
            rest_token: env_string("UPSTASH_REDIS_REST_TOKEN"),
        }
    }
}

// == Backend Config ==
/// Exactly one backend with the settings it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// In-process store, no settings
    Memory,
    /// Network store reached at `url`
    Managed { url: String },
    /// REST store at `url`, authenticated with `token`
    Rest { url: String, token: String },
}

impl BackendConfig {
    /// Picks the backend from raw settings.
    ///
    /// - `memory` selects the in-process store
    /// - `rest`/`upstash` requires URL and token, otherwise fails
    /// - `managed`/`redis` selects the network store, defaulting its URL
    /// - no tag (or an unknown one) selects the network store when a
    ///   connection URL is set, else the in-process store
    pub fn resolve(settings: &CacheSettings) -> Result<Self> {
        let provider = settings
            .provider
            .as_deref()
            .map(|p| p.trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty());
        let redis_url = non_blank(&settings.redis_url);

        match provider.as_deref() {
            Some("memory") => Ok(BackendConfig::Memory),
            Some("rest") | Some("upstash") => {
                match (non_blank(&settings.rest_url), non_blank(&settings.rest_token)) {
                    (Some(url), Some(token)) => Ok(BackendConfig::Rest { url, token }),
                    _ => Err(CacheError::Config(
                        "Upstash URL and token are required for the rest provider".to_string(),
                    )),
                }
            }
            Some("managed") | Some("redis") => Ok(BackendConfig::Managed {
                url: redis_url.unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            }),
            _ => Ok(match redis_url {
                Some(url) => BackendConfig::Managed { url },
                None => BackendConfig::Memory,
            }),
        }
    }

    /// Provider tag of the selected backend.
    pub fn provider(&self) -> &'static str {
        match self {
            BackendConfig::Memory => "memory",
            BackendConfig::Managed { .. } => "managed",
            BackendConfig::Rest { .. } => "rest",
        }
    }
}

// == Backend Options ==
/// Tuning knobs shared by all backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendOptions {
    /// Period of the in-memory expiry sweep
    pub sweep_interval: Duration,
    /// Per-request timeout of the REST client
    pub request_timeout: Duration,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Raw backend selection
    pub cache: CacheSettings,
    /// Backend tuning
    pub options: BackendOptions,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - see [`CacheSettings::from_env`]
    /// - `CACHE_SWEEP_INTERVAL_MS` - in-memory sweep period (default: 1000)
    /// - `CACHE_REQUEST_TIMEOUT_SECS` - REST request timeout (default: 10)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = BackendOptions::default();

        Self {
            cache: CacheSettings::from_env(),
            options: BackendOptions {
                sweep_interval: env_parse("CACHE_SWEEP_INTERVAL_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.sweep_interval),
                request_timeout: env_parse("CACHE_REQUEST_TIMEOUT_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.request_timeout),
            },
            server_port: env_parse("SERVER_PORT").unwrap_or(3000),
        }
    }

    /// Resolves the configured backend; fails fast on missing settings.
    pub fn backend(&self) -> Result<BackendConfig> {
        BackendConfig::resolve(&self.cache)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheSettings::default(),
            options: BackendOptions::default(),
            server_port: 3000,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
