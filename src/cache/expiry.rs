//! Expiry Queue Module
//!
//! Min-heap of `(deadline, key)` pairs swept by one periodic task, in place of
//! one timer per key.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

// == Expiry Queue ==
/// Pending deadlines ordered earliest first.
///
/// Items are never removed when a key is overwritten or deleted; a popped
/// item is only acted on if the key still carries that exact deadline.
#[derive(Debug, Default)]
pub struct ExpiryQueue {
    heap: BinaryHeap<Reverse<(u64, String)>>,
}

impl ExpiryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `key` is due at `deadline` (Unix milliseconds).
    pub fn schedule(&mut self, deadline: u64, key: &str) {
        self.heap.push(Reverse((deadline, key.to_string())));
    }

    /// Pops the earliest item if it is due at `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, String)> {
        match self.heap.peek() {
            Some(Reverse((deadline, _))) if *deadline <= now => {
                self.heap.pop().map(|Reverse(item)| item)
            }
            _ => None,
        }
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Replaces the queue contents with the given live deadlines.
    pub fn rebuild<'a>(&mut self, live: impl IntoIterator<Item = (u64, &'a str)>) {
        self.heap = live
            .into_iter()
            .map(|(deadline, key)| Reverse((deadline, key.to_string())))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut queue = ExpiryQueue::new();
        queue.schedule(300, "c");
        queue.schedule(100, "a");
        queue.schedule(200, "b");

        assert_eq!(queue.next_deadline(), Some(100));
        assert_eq!(queue.pop_due(250), Some((100, "a".to_string())));
        assert_eq!(queue.pop_due(250), Some((200, "b".to_string())));
        assert_eq!(queue.pop_due(250), None);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut queue = ExpiryQueue::new();
        queue.schedule(1000, "k");
        assert_eq!(queue.pop_due(999), None);
        assert_eq!(queue.pop_due(1000), Some((1000, "k".to_string())));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_rebuild_drops_stale_items() {
        let mut queue = ExpiryQueue::new();
        queue.schedule(10, "k");
        queue.schedule(20, "k");
        queue.schedule(30, "gone");

        queue.rebuild(vec![(20, "k")]);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(u64::MAX), Some((20, "k".to_string())));
    }

    #[test]
    fn test_clear() {
        let mut queue = ExpiryQueue::new();
        queue.schedule(1, "a");
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }
}
