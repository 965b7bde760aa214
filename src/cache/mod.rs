//! Cache Module
//!
//! One cache contract ([`Cache`]) with three interchangeable backends:
//!
//! ```text
//! Arc<dyn Cache>
//!   ├── InMemoryCache   <- process-local map, lazy expiry + periodic sweep
//!   ├── RedisCache      <- Redis protocol, server-side TTL and KEYS
//!   └── UpstashCache    <- Redis-over-REST, one HTTP call per command
//! ```
//!
//! Optional groups (hash, list, set, sorted set) are separate traits reached
//! through typed queries such as [`Cache::hashes`]; a backend either provides
//! a whole group or none of it.
//!
//! The backend is picked once at startup by [`create_cache`].

pub(crate) mod entry;
mod expiry;
mod factory;
mod glob;
mod memory;
mod redis;
mod store;
mod traits;
mod upstash;


// Re-export public types
pub use entry::CacheEntry;
pub use expiry::ExpiryQueue;
pub use factory::{build_cache, create_cache};
pub use glob::GlobPattern;
pub use memory::{InMemoryCache, DEFAULT_SWEEP_INTERVAL};
pub use self::redis::{ConnectionState, RedisCache, DEFAULT_REDIS_URL};
pub use store::MemoryStore;
pub use traits::{
    require_hashes, require_lists, require_sets, require_sorted_sets, Cache, Capabilities,
    HashOps, ListOps, ScoredMember, SetOps, SortedSetOps, Ttl,
};
pub use upstash::{UpstashCache, DEFAULT_REQUEST_TIMEOUT};
