//! Cache Bridge - one cache contract over interchangeable backends
//!
//! Application code talks to an `Arc<dyn Cache>`; the backend behind it is an
//! in-process map with TTLs, a Redis server, or an Upstash REST endpoint,
//! chosen once at startup from configuration.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{create_cache, Cache};
pub use config::Config;
pub use error::{CacheError, Result};
