//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Expiry Sweeper: removes expired in-memory entries at a fixed interval

mod sweeper;

pub use sweeper::spawn_expiry_sweeper;
