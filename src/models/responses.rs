//! Response DTOs for the demo HTTP surface
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::Capabilities;

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

// == Health ==
/// Cache section of the health report.
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    /// Whether the backend can currently serve commands
    pub connected: bool,
    /// Backend identifier: `memory`, `redis` or `upstash`
    pub provider: String,
    /// Optional command groups the backend provides
    pub capabilities: Capabilities,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the process is serving
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub cache: CacheHealth,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn ok(cache: CacheHealth) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: now_rfc3339(),
            cache,
        }
    }
}

// == Cache Status ==
/// Response body for the cache round-trip check (GET /cache/status)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatusResponse {
    /// `connected`, `disconnected` or `error`
    pub status: String,
    /// `passed`, `failed` or `skipped`; absent on error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    /// Failure message when the check itself errored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl CacheStatusResponse {
    /// Check ran against a live backend.
    pub fn connected(passed: bool) -> Self {
        let test = if passed { "passed" } else { "failed" };
        Self {
            status: "connected".to_string(),
            test: Some(test.to_string()),
            error: None,
            timestamp: now_rfc3339(),
        }
    }

    /// Backend reported itself unavailable; no commands were sent.
    pub fn disconnected() -> Self {
        Self {
            status: "disconnected".to_string(),
            test: Some("skipped".to_string()),
            error: None,
            timestamp: now_rfc3339(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            test: None,
            error: Some(error.into()),
            timestamp: now_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::ok(CacheHealth {
            connected: true,
            provider: "memory".to_string(),
            capabilities: Capabilities::default(),
        });
        let json: Value = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].is_string());
        assert_eq!(json["cache"]["connected"], true);
        assert_eq!(json["cache"]["provider"], "memory");
        assert_eq!(json["cache"]["capabilities"]["hashes"], false);
    }

    #[test]
    fn test_status_connected_serialize() {
        let json: Value = serde_json::to_value(CacheStatusResponse::connected(true)).unwrap();
        assert_eq!(json["status"], "connected");
        assert_eq!(json["test"], "passed");
        assert!(json.get("error").is_none());

        let json: Value = serde_json::to_value(CacheStatusResponse::connected(false)).unwrap();
        assert_eq!(json["test"], "failed");
    }

    #[test]
    fn test_status_disconnected_serialize() {
        let json: Value = serde_json::to_value(CacheStatusResponse::disconnected()).unwrap();
        assert_eq!(json["status"], "disconnected");
        assert_eq!(json["test"], "skipped");
    }

    #[test]
    fn test_status_error_serialize() {
        let json: Value = serde_json::to_value(CacheStatusResponse::error("boom")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("test").is_none());
    }
}
