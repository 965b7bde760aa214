//! Upstash REST Backend
//!
//! Stateless client for a Redis-compatible REST endpoint. Each command is one
//! `POST` of a JSON array (`["SET", "k", "v"]`) with a bearer token; the reply
//! is `{"result": ...}` or `{"error": "..."}`.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::traits::{check_scored_members, check_scores, check_set_ttl, check_values};
use crate::cache::{
    Cache, HashOps, ListOps, ScoredMember, SetOps, SortedSetOps, Ttl,
};
use crate::error::{BoxError, CacheError, RemoteError, Result};

/// Per-request timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of every REST reply.
#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

// == Upstash Cache ==
/// REST-backed cache. Holds no connection; every call is a full round trip.
pub struct UpstashCache {
    client: Client,
    endpoint: Url,
    token: String,
}

impl fmt::Debug for UpstashCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstashCache")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &"***")
            .finish()
    }
}

impl UpstashCache {
    // == Constructor ==
    /// Creates a client with [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn new(endpoint: &str, token: &str) -> Result<Self> {
        Self::with_timeout(endpoint, token, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a client, validating endpoint and token up front.
    ///
    /// # Errors
    /// `CacheError::Config` if either setting is blank or the endpoint is not
    /// an absolute http(s) URL.
    pub fn with_timeout(endpoint: &str, token: &str, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.trim();
        let token = token.trim();

        if endpoint.is_empty() {
            return Err(CacheError::Config(
                "Upstash REST URL is required".to_string(),
            ));
        }
        if token.is_empty() {
            return Err(CacheError::Config(
                "Upstash REST token is required".to_string(),
            ));
        }

        let endpoint = Url::parse(endpoint).map_err(|e| {
            CacheError::Config(format!("Invalid Upstash REST URL '{}': {}", endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(CacheError::Config(format!(
                "Upstash REST URL must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!(endpoint = %endpoint, "Upstash REST client initialized");

        Ok(Self {
            client,
            endpoint,
            token: token.to_string(),
        })
    }

    // == Transport ==
    /// Sends one command and returns the raw `result` value.
    async fn send(&self, args: &[String]) -> std::result::Result<Value, BoxError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let reply: RestReply = match serde_json::from_str(&body) {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => {
                return Err(RemoteError(format!("HTTP {}: {}", status, body.trim())).into());
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(message) = reply.error {
            return Err(RemoteError(message).into());
        }
        if !status.is_success() {
            return Err(RemoteError(format!("HTTP {}", status)).into());
        }

        Ok(reply.result)
    }

    /// Sends one command and decodes its result, mapping every failure to an
    /// operation error tagged with `op` and `key`.
    async fn command<T: DeserializeOwned>(
        &self,
        op: &'static str,
        key: &str,
        args: Vec<String>,
    ) -> Result<T> {
        let result = match self.send(&args).await {
            Ok(value) => serde_json::from_value::<T>(value).map_err(BoxError::from),
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            error!(op, key, error = %e, "Upstash command failed");
            CacheError::operation(op, key, e)
        })
    }
}

/// Builds a command line from its fixed leading parts.
fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

/// Folds a flat `[field, value, field, value, ...]` reply into a map.
fn pairs_to_map(flat: Vec<String>) -> HashMap<String, String> {
    flat.chunks(2)
        .filter_map(|pair| match pair {
            [field, value] => Some((field.clone(), value.clone())),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl Cache for UpstashCache {
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
        check_set_ttl(ttl_seconds)?;

        let mut cmd = args(["SET", key, value]);
        if let Some(ttl) = ttl_seconds {
            cmd.push("EX".to_string());
            cmd.push(ttl.to_string());
        }
        self.command::<Value>("SET", key, cmd).await?;

        debug!(key, ttl = ?ttl_seconds, "Set cache");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self.command("GET", key, args(["GET", key])).await?;
        debug!(key, hit = value.is_some(), "Get cache");
        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.command::<Value>("DEL", key, args(["DEL", key])).await?;
        debug!(key, "Deleted cache");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let count: i64 = self.command("EXISTS", key, args(["EXISTS", key])).await?;
        Ok(count > 0)
    }

    async fn ttl(&self, key: &str) -> Result<Ttl> {
        let raw: i64 = self.command("TTL", key, args(["TTL", key])).await?;
        Ok(Ttl::from_raw(raw))
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<()> {
        let ttl = ttl_seconds.to_string();
        self.command::<Value>("EXPIRE", key, args(["EXPIRE", key, &ttl]))
            .await?;

        debug!(key, ttl = ttl_seconds, "Set expiry");
        Ok(())
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut cmd = args(["MGET"]);
        cmd.extend(keys.iter().map(|key| key.to_string()));
        self.command("MGET", &keys.join(","), cmd).await
    }

    async fn mset(&self, entries: &HashMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut cmd = args(["MSET"]);
        for (key, value) in entries {
            cmd.push(key.clone());
            cmd.push(value.clone());
        }
        let label = entries.keys().cloned().collect::<Vec<_>>().join(",");
        self.command::<Value>("MSET", &label, cmd).await?;

        debug!(count = entries.len(), "Set multiple keys");
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.command("KEYS", pattern, args(["KEYS", pattern])).await
    }

    /// Checks the endpoint with `PING`; any failure reads as disconnected.
    async fn is_connected(&self) -> bool {
        match self.send(&args(["PING"])).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Failed to ping Upstash");
                false
            }
        }
    }

    async fn disconnect(&self) -> Result<()> {
        debug!("Upstash REST client holds no connection");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "upstash"
    }

    fn hashes(&self) -> Option<&dyn HashOps> {
        Some(self)
    }

    fn lists(&self) -> Option<&dyn ListOps> {
        Some(self)
    }

    fn sets(&self) -> Option<&dyn SetOps> {
        Some(self)
    }

    fn sorted_sets(&self) -> Option<&dyn SortedSetOps> {
        Some(self)
    }
}

#[async_trait]
impl HashOps for UpstashCache {
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.command::<Value>("HSET", key, args(["HSET", key, field, value]))
            .await?;

        debug!(key, field, "HSET");
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.command("HGET", key, args(["HGET", key, field])).await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let flat: Option<Vec<String>> =
            self.command("HGETALL", key, args(["HGETALL", key])).await?;
        Ok(pairs_to_map(flat.unwrap_or_default()))
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<()> {
        self.command::<Value>("HDEL", key, args(["HDEL", key, field]))
            .await?;

        debug!(key, field, "HDEL");
        Ok(())
    }
}

#[async_trait]
impl ListOps for UpstashCache {
    async fn lpush(&self, key: &str, values: &[&str]) -> Result<u64> {
        check_values("LPUSH", values)?;
        let mut cmd = args(["LPUSH", key]);
        cmd.extend(values.iter().map(|v| v.to_string()));
        self.command("LPUSH", key, cmd).await
    }

    async fn rpush(&self, key: &str, values: &[&str]) -> Result<u64> {
        check_values("RPUSH", values)?;
        let mut cmd = args(["RPUSH", key]);
        cmd.extend(values.iter().map(|v| v.to_string()));
        self.command("RPUSH", key, cmd).await
    }

    async fn lpop(&self, key: &str) -> Result<Option<String>> {
        self.command("LPOP", key, args(["LPOP", key])).await
    }

    async fn rpop(&self, key: &str) -> Result<Option<String>> {
        self.command("RPOP", key, args(["RPOP", key])).await
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let (start, stop) = (start.to_string(), stop.to_string());
        self.command("LRANGE", key, args(["LRANGE", key, &start, &stop]))
            .await
    }
}

#[async_trait]
impl SetOps for UpstashCache {
    async fn sadd(&self, key: &str, members: &[&str]) -> Result<u64> {
        check_values("SADD", members)?;
        let mut cmd = args(["SADD", key]);
        cmd.extend(members.iter().map(|m| m.to_string()));
        self.command("SADD", key, cmd).await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        self.command("SMEMBERS", key, args(["SMEMBERS", key])).await
    }

    async fn srem(&self, key: &str, members: &[&str]) -> Result<u64> {
        check_values("SREM", members)?;
        let mut cmd = args(["SREM", key]);
        cmd.extend(members.iter().map(|m| m.to_string()));
        self.command("SREM", key, cmd).await
    }

    async fn spop(&self, key: &str, count: Option<usize>) -> Result<Vec<String>> {
        match count {
            Some(count) => {
                let count = count.to_string();
                let members: Option<Vec<String>> = self
                    .command("SPOP", key, args(["SPOP", key, &count]))
                    .await?;
                Ok(members.unwrap_or_default())
            }
            None => {
                let member: Option<String> =
                    self.command("SPOP", key, args(["SPOP", key])).await?;
                Ok(member.into_iter().collect())
            }
        }
    }
}

#[async_trait]
impl SortedSetOps for UpstashCache {
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<u64> {
        check_scores([score])?;
        let score = score.to_string();
        self.command("ZADD", key, args(["ZADD", key, &score, member]))
            .await
    }

    async fn zadd_many(&self, key: &str, items: &[ScoredMember]) -> Result<u64> {
        check_scored_members(items)?;
        let mut cmd = args(["ZADD", key]);
        for item in items {
            cmd.push(item.score.to_string());
            cmd.push(item.member.clone());
        }
        self.command("ZADD", key, cmd).await
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let (start, stop) = (start.to_string(), stop.to_string());
        self.command("ZRANGE", key, args(["ZRANGE", key, &start, &stop]))
            .await
    }

    async fn zrem(&self, key: &str, members: &[&str]) -> Result<u64> {
        check_values("ZREM", members)?;
        let mut cmd = args(["ZREM", key]);
        cmd.extend(members.iter().map(|m| m.to_string()));
        self.command("ZREM", key, cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "test-token";

    #[test]
    fn test_missing_url_rejected() {
        let result = UpstashCache::new("", TOKEN);
        assert!(matches!(result, Err(CacheError::Config(_))));
    }

    #[test]
    fn test_missing_token_rejected() {
        let result = UpstashCache::new("https://example.upstash.io", "   ");
        assert!(matches!(result, Err(CacheError::Config(_))));
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            UpstashCache::new("not a url", TOKEN),
            Err(CacheError::Config(_))
        ));
        assert!(matches!(
            UpstashCache::new("ftp://example.com", TOKEN),
            Err(CacheError::Config(_))
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let cache = UpstashCache::new("https://example.upstash.io", "s3cr3t").unwrap();
        let rendered = format!("{:?}", cache);
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("example.upstash.io"));
    }

    #[test]
    fn test_pairs_to_map() {
        let flat = vec![
            "name".to_string(),
            "Ada".to_string(),
            "role".to_string(),
            "admin".to_string(),
        ];
        let map = pairs_to_map(flat);
        assert_eq!(map.len(), 2);
        assert_eq!(map["name"], "Ada");
        assert_eq!(map["role"], "admin");
        assert!(pairs_to_map(Vec::new()).is_empty());
    }

    #[test]
    fn test_args_builder() {
        assert_eq!(args(["GET", "k"]), vec!["GET".to_string(), "k".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let cache = UpstashCache::with_timeout(
            "http://127.0.0.1:1",
            TOKEN,
            Duration::from_secs(2),
        )
        .unwrap();

        assert!(!cache.is_connected().await);

        let result = cache.get("k").await;
        assert!(matches!(result, Err(CacheError::Operation { op: "GET", .. })));

        cache.disconnect().await.unwrap();
        cache.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_arguments_rejected_before_io() {
        let cache = UpstashCache::new("http://127.0.0.1:1", TOKEN).unwrap();

        assert!(matches!(
            cache.zadd_many("z", &[]).await,
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(matches!(
            cache.zadd("z", f64::INFINITY, "m").await,
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(matches!(
            cache.sadd("s", &[]).await,
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(cache.mget(&[]).await.unwrap().is_empty());
    }
}
