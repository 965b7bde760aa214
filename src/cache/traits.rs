//! Cache Contract
//!
//! The operation set every backend implements, plus the optional capability
//! groups (hash, list, set, sorted set) that only some backends provide.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::error::{CacheError, Result};

// == Ttl ==
/// Remaining lifetime of a key as reported by [`Cache::ttl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Key is live and expires in this many seconds (always >= 1)
    Expires(u64),
    /// Key is live and has no expiry
    Persistent,
    /// Key does not exist or has already expired
    Missing,
}

impl Ttl {
    /// Raw sentinel for a key without expiry.
    pub const NO_EXPIRY: i64 = -1;
    /// Raw sentinel for a missing key.
    pub const NOT_FOUND: i64 = -2;

    /// Interprets a Redis-style integer TTL reply.
    ///
    /// A remainder of zero or less reads as missing: the key is gone by the
    /// time the caller sees the answer.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            Self::NO_EXPIRY => Ttl::Persistent,
            secs if secs > 0 => Ttl::Expires(secs as u64),
            _ => Ttl::Missing,
        }
    }

    /// Returns the Redis-style integer form (`-1`, `-2` or seconds).
    pub fn as_raw(&self) -> i64 {
        match self {
            Ttl::Expires(secs) => *secs as i64,
            Ttl::Persistent => Self::NO_EXPIRY,
            Ttl::Missing => Self::NOT_FOUND,
        }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Expires(secs) => write!(f, "{}s", secs),
            Ttl::Persistent => write!(f, "none"),
            Ttl::Missing => write!(f, "missing"),
        }
    }
}

// == Scored Member ==
/// One `(score, member)` pair of a sorted set.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub score: f64,
    pub member: String,
}

impl ScoredMember {
    pub fn new(score: f64, member: impl Into<String>) -> Self {
        Self {
            score,
            member: member.into(),
        }
    }
}

// == Capabilities ==
/// Which optional operation groups a backend provides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub hashes: bool,
    pub lists: bool,
    pub sets: bool,
    pub sorted_sets: bool,
}

// == Core Contract ==
/// Operations every cache backend supports.
///
/// Callers hold an `Arc<dyn Cache>` and never depend on the concrete backend.
/// Every call is fallible; absence of a key is reported through return values,
/// never through an error.
#[async_trait]
pub trait Cache: Send + Sync + fmt::Debug {
    /// Stores `value` under `key`. Without `ttl_seconds` the entry never expires.
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()>;

    /// Returns the live value for `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn del(&self, key: &str) -> Result<()>;

    /// Returns true if `key` holds a live entry.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Returns the remaining lifetime of `key`.
    async fn ttl(&self, key: &str) -> Result<Ttl>;

    /// Sets a new TTL on an existing key; does nothing if the key is missing.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<()>;

    /// Fetches several keys at once; the result is aligned with `keys`.
    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>>;

    /// Stores every pair without expiry.
    async fn mset(&self, entries: &HashMap<String, String>) -> Result<()>;

    /// Returns live keys matching a `*`-wildcard pattern.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Liveness check. Never fails; an unreachable backend reports false.
    async fn is_connected(&self) -> bool;

    /// Releases held resources. Safe to call repeatedly or before first use.
    async fn disconnect(&self) -> Result<()>;

    /// Short backend identifier used in logs and health output.
    fn provider_name(&self) -> &'static str;

    /// Hash operations, when supported.
    fn hashes(&self) -> Option<&dyn HashOps> {
        None
    }

    /// List operations, when supported.
    fn lists(&self) -> Option<&dyn ListOps> {
        None
    }

    /// Set operations, when supported.
    fn sets(&self) -> Option<&dyn SetOps> {
        None
    }

    /// Sorted set operations, when supported.
    fn sorted_sets(&self) -> Option<&dyn SortedSetOps> {
        None
    }

    /// Summary of the optional groups this backend exposes.
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            hashes: self.hashes().is_some(),
            lists: self.lists().is_some(),
            sets: self.sets().is_some(),
            sorted_sets: self.sorted_sets().is_some(),
        }
    }
}

// == Optional Groups ==
/// Field-level operations on hash-valued keys.
#[async_trait]
pub trait HashOps: Send + Sync {
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()>;
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;
    async fn hdel(&self, key: &str, field: &str) -> Result<()>;
}

/// Operations on list-valued keys.
///
/// `lrange` indices are inclusive and may be negative (`-1` is the last element).
#[async_trait]
pub trait ListOps: Send + Sync {
    /// Prepends values; returns the new list length.
    async fn lpush(&self, key: &str, values: &[&str]) -> Result<u64>;
    /// Appends values; returns the new list length.
    async fn rpush(&self, key: &str, values: &[&str]) -> Result<u64>;
    async fn lpop(&self, key: &str) -> Result<Option<String>>;
    async fn rpop(&self, key: &str) -> Result<Option<String>>;
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;
}

/// Operations on set-valued keys.
#[async_trait]
pub trait SetOps: Send + Sync {
    /// Adds members; returns how many were not already present.
    async fn sadd(&self, key: &str, members: &[&str]) -> Result<u64>;
    async fn smembers(&self, key: &str) -> Result<Vec<String>>;
    /// Removes members; returns how many were present.
    async fn srem(&self, key: &str, members: &[&str]) -> Result<u64>;
    /// Removes and returns random members. `None` pops at most one.
    async fn spop(&self, key: &str, count: Option<usize>) -> Result<Vec<String>>;
}

/// Operations on sorted-set-valued keys.
#[async_trait]
pub trait SortedSetOps: Send + Sync {
    /// Adds one member; returns 1 if it was new, 0 if its score was updated.
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<u64>;
    /// Adds many members in one call; returns how many were new.
    async fn zadd_many(&self, key: &str, items: &[ScoredMember]) -> Result<u64>;
    /// Members between two ranks (inclusive, negative from the end), lowest score first.
    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;
    /// Removes members; returns how many were present.
    async fn zrem(&self, key: &str, members: &[&str]) -> Result<u64>;
}

// == Capability Queries ==
/// Returns the hash group or an `Unsupported` error.
pub fn require_hashes(cache: &dyn Cache) -> Result<&dyn HashOps> {
    cache.hashes().ok_or(CacheError::Unsupported {
        backend: cache.provider_name(),
        capability: "hash",
    })
}

/// Returns the list group or an `Unsupported` error.
pub fn require_lists(cache: &dyn Cache) -> Result<&dyn ListOps> {
    cache.lists().ok_or(CacheError::Unsupported {
        backend: cache.provider_name(),
        capability: "list",
    })
}

/// Returns the set group or an `Unsupported` error.
pub fn require_sets(cache: &dyn Cache) -> Result<&dyn SetOps> {
    cache.sets().ok_or(CacheError::Unsupported {
        backend: cache.provider_name(),
        capability: "set",
    })
}

/// Returns the sorted set group or an `Unsupported` error.
pub fn require_sorted_sets(cache: &dyn Cache) -> Result<&dyn SortedSetOps> {
    cache.sorted_sets().ok_or(CacheError::Unsupported {
        backend: cache.provider_name(),
        capability: "sorted set",
    })
}

// == Argument Checks ==
/// Rejects a zero TTL on `set`; the network store refuses it natively.
pub(crate) fn check_set_ttl(ttl_seconds: Option<u64>) -> Result<()> {
    match ttl_seconds {
        Some(0) => Err(CacheError::InvalidArgument(
            "TTL must be at least 1 second".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Rejects sorted set input a backend cannot translate into one call.
pub(crate) fn check_scored_members(items: &[ScoredMember]) -> Result<()> {
    if items.is_empty() {
        return Err(CacheError::InvalidArgument(
            "zadd_many requires at least one (score, member) pair".to_string(),
        ));
    }
    check_scores(items.iter().map(|item| item.score))
}

/// Rejects a multi-value command called with nothing to add or remove.
pub(crate) fn check_values(op: &str, values: &[&str]) -> Result<()> {
    if values.is_empty() {
        warn!(op, "Rejected call without values");
        return Err(CacheError::InvalidArgument(format!(
            "{} requires at least one value",
            op
        )));
    }
    Ok(())
}

pub(crate) fn check_scores(scores: impl IntoIterator<Item = f64>) -> Result<()> {
    if scores.into_iter().any(|score| !score.is_finite()) {
        return Err(CacheError::InvalidArgument(
            "sorted set scores must be finite".to_string(),
        ));
    }
    Ok(())
}
