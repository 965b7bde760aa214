//! API Module
//!
//! HTTP handlers and routing for the demo server.
//!
//! # Endpoints
//! - `GET /health` - Health check with backend details
//! - `GET /cache/status` - Cache round-trip check

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
