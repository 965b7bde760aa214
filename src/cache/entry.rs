//! Cache Entry Module
//!
//! Value plus optional absolute expiry, as held by the in-memory backend.

use chrono::Utc;

// == Cache Entry ==
/// A stored value with its expiry deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry written at `now` with an optional TTL in seconds.
    pub fn new(value: String, ttl_seconds: Option<u64>, now: u64) -> Self {
        Self {
            value,
            expires_at: ttl_seconds.map(|ttl| deadline(now, ttl)),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is dead at `now`.
    ///
    /// An entry whose deadline equals `now` is already expired, so a read and
    /// a TTL query taken at the same instant agree.
    pub fn is_expired(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Remaining Seconds ==
    /// Remaining lifetime rounded up to whole seconds.
    ///
    /// # Returns
    /// - `None` if the entry has no TTL
    /// - `Some(0)` if the deadline has passed
    /// - `Some(secs)` otherwise
    pub fn remaining_secs(&self, now: u64) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(now).div_ceil(1000))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Absolute deadline `ttl_seconds` after `now`.
pub fn deadline(now: u64, ttl_seconds: u64) -> u64 {
    now.saturating_add(ttl_seconds.saturating_mul(1000))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("test_value".to_string(), None, NOW);

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired(NOW + 10_000_000));
        assert_eq!(entry.remaining_secs(NOW), None);
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("test_value".to_string(), Some(60), NOW);

        assert_eq!(entry.expires_at, Some(NOW + 60_000));
        assert!(!entry.is_expired(NOW + 59_999));
        assert!(entry.is_expired(NOW + 60_001));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("test".to_string(), Some(1), NOW);

        // Deadline reached exactly counts as expired
        assert!(entry.is_expired(NOW + 1000));
        assert_eq!(entry.remaining_secs(NOW + 1000), Some(0));
    }

    #[test]
    fn test_remaining_secs_rounds_up() {
        let entry = CacheEntry::new("v".to_string(), Some(10), NOW);

        assert_eq!(entry.remaining_secs(NOW), Some(10));
        assert_eq!(entry.remaining_secs(NOW + 1), Some(10));
        assert_eq!(entry.remaining_secs(NOW + 9_001), Some(1));
        assert_eq!(entry.remaining_secs(NOW + 20_000), Some(0));
    }

    #[test]
    fn test_deadline_saturates() {
        assert_eq!(deadline(u64::MAX - 5, 10), u64::MAX);
    }

    #[test]
    fn test_clock_is_monotonic_enough() {
        let a = current_timestamp_ms();
        let b = current_timestamp_ms();
        assert!(b >= a);
        assert!(a > NOW);
    }
}
