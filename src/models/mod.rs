//! Response models for the demo HTTP surface
//!
//! This module defines the DTOs serialized by the health and cache status
//! checks.

pub mod responses;

// Re-export commonly used types
pub use responses::{CacheHealth, CacheStatusResponse, HealthResponse};
