//! Memory Store Module
//!
//! Synchronous core of the in-memory backend: a HashMap of entries plus the
//! expiry queue, with lazy expiry on every read path.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, ExpiryQueue, GlobPattern, Ttl};

/// Extra queue items tolerated before stale deadlines are compacted away.
const COMPACT_SLACK: usize = 1024;

// == Memory Store ==
/// Entries and their pending deadlines. Callers pass the current time so the
/// map and the queue are always judged against the same instant.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Pending expiry deadlines
    expiry: ExpiryQueue,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a value, replacing any prior entry and its deadline.
    ///
    /// Writes also collect due deadlines, so the queue stays bounded even
    /// when no sweeper runs.
    pub fn set(&mut self, key: &str, value: String, ttl: Option<u64>, now: u64) {
        let entry = CacheEntry::new(value, ttl, now);
        if let Some(deadline) = entry.expires_at {
            self.expiry.schedule(deadline, key);
        }
        self.entries.insert(key.to_string(), entry);
        self.cleanup_expired(now);
    }

    // == Get ==
    /// Returns the live value for `key`, dropping it if it has expired.
    pub fn get(&mut self, key: &str, now: u64) -> Option<String> {
        self.live(key, now).map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes `key`; returns whether an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Exists ==
    pub fn exists(&mut self, key: &str, now: u64) -> bool {
        self.live(key, now).is_some()
    }

    // == Time To Live ==
    pub fn ttl(&mut self, key: &str, now: u64) -> Ttl {
        match self.live(key, now) {
            None => Ttl::Missing,
            Some(entry) => match entry.remaining_secs(now) {
                None => Ttl::Persistent,
                Some(0) => Ttl::Missing,
                Some(secs) => Ttl::Expires(secs),
            },
        }
    }

    // == Expire ==
    /// Puts a new deadline on a live key; returns false if the key is missing.
    pub fn expire(&mut self, key: &str, ttl: u64, now: u64) -> bool {
        let Some(entry) = self.live(key, now) else {
            return false;
        };
        let deadline = crate::cache::entry::deadline(now, ttl);
        entry.expires_at = Some(deadline);
        self.expiry.schedule(deadline, key);
        self.cleanup_expired(now);
        true
    }

    // == Keys ==
    /// Live keys matching `pattern`. Every candidate is re-checked for expiry.
    pub fn keys(&mut self, pattern: &GlobPattern, now: u64) -> Vec<String> {
        let candidates: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect();

        candidates
            .into_iter()
            .filter(|key| self.live(key, now).is_some())
            .collect()
    }

    // == Cleanup Expired ==
    /// Removes entries whose deadline has passed. Returns the number removed.
    ///
    /// A queue item only removes its key if the entry still carries that
    /// deadline; items left behind by overwrites or deletes are dropped.
    pub fn cleanup_expired(&mut self, now: u64) -> usize {
        let mut removed = 0;

        while let Some((deadline, key)) = self.expiry.pop_due(now) {
            let current = self
                .entries
                .get(&key)
                .is_some_and(|entry| entry.expires_at == Some(deadline));
            if current {
                self.entries.remove(&key);
                removed += 1;
            }
        }

        self.compact_if_needed();
        removed
    }

    /// Rebuilds the queue from live deadlines once stale items dominate it.
    fn compact_if_needed(&mut self) {
        if self.expiry.len() <= self.entries.len() * 2 + COMPACT_SLACK {
            return;
        }
        self.expiry.rebuild(
            self.entries
                .iter()
                .filter_map(|(key, entry)| entry.expires_at.map(|d| (d, key.as_str()))),
        );
        debug!(pending = self.expiry.len(), "Compacted expiry queue");
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.expiry.clear();
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet collected.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of pending queue items (live and stale).
    pub fn pending_deadlines(&self) -> usize {
        self.expiry.len()
    }

    // == Lazy Expiry ==
    fn live(&mut self, key: &str, now: u64) -> Option<&mut CacheEntry> {
        if self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(now))
        {
            self.entries.remove(key);
            debug!(key, "Expired key on access");
            return None;
        }
        self.entries.get_mut(key)
    }
}
