//! Settlement receipt idempotency guard.
//!
//! Each `SettlementFinalized` event may be observed more than once (indexer
//! restarts, checkpoint replays). The edge decrement must apply exactly once
//! per receipt hash, so the guard remembers which receipts have already been
//! applied.
//!
//! The guard maintains an LRU-style bounded cache so memory usage stays
//! predictable in long-running processes.

use std::collections::{HashSet, VecDeque};

use splitchain_types::ReceiptHash;

/// Tracks which settlement receipts have already been applied to an edge.
///
/// Internally stores a bounded set of `ReceiptHash`es with LRU eviction.
/// When the set reaches `max_size`, the oldest entry is evicted to make room.
pub struct ReceiptGuard {
    /// Receipts that have already been applied.
    applied: HashSet<ReceiptHash>,
    /// Insertion order for LRU eviction (front = oldest).
    order: VecDeque<ReceiptHash>,
    /// Maximum number of entries before eviction kicks in.
    max_size: usize,
}

impl ReceiptGuard {
    /// Create a new guard with the given maximum cache size.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "ReceiptGuard max_size must be > 0");
        Self {
            applied: HashSet::with_capacity(max_size.min(1024)),
            order: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Record a receipt. Returns `true` if this is the first observation
    /// (the caller should apply the decrement) and `false` on a replay
    /// (the caller must no-op).
    pub fn observe(&mut self, receipt: ReceiptHash) -> bool {
        if self.applied.contains(&receipt) {
            return false;
        }

        // Evict oldest if at capacity.
        if self.applied.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.applied.remove(&oldest);
            }
        }

        self.applied.insert(receipt);
        self.order.push_back(receipt);
        true
    }

    /// Whether a receipt has already been applied.
    #[must_use]
    pub fn is_applied(&self, receipt: &ReceiptHash) -> bool {
        self.applied.contains(receipt)
    }

    /// Number of receipts currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    /// Whether the guard is empty (no receipts tracked).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(b: u8) -> ReceiptHash {
        ReceiptHash::from_bytes([b; 32])
    }

    #[test]
    fn first_observation_applies() {
        let mut guard = ReceiptGuard::new(100);
        assert!(guard.observe(receipt(1)));
        assert!(guard.is_applied(&receipt(1)));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn replay_is_noop() {
        let mut guard = ReceiptGuard::new(100);
        assert!(guard.observe(receipt(1)));
        assert!(!guard.observe(receipt(1)), "Replay must not apply twice");
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn evicts_oldest() {
        let mut guard = ReceiptGuard::new(3);
        assert!(guard.observe(receipt(1)));
        assert!(guard.observe(receipt(2)));
        assert!(guard.observe(receipt(3)));
        assert_eq!(guard.len(), 3);

        // Adding a fourth should evict receipt(1) (the oldest).
        assert!(guard.observe(receipt(4)));
        assert_eq!(guard.len(), 3);
        assert!(!guard.is_applied(&receipt(1)), "oldest should be evicted");
        assert!(guard.is_applied(&receipt(2)));
        assert!(guard.is_applied(&receipt(3)));
        assert!(guard.is_applied(&receipt(4)));
    }

    #[test]
    fn empty_guard() {
        let guard = ReceiptGuard::new(10);
        assert!(guard.is_empty());
        assert_eq!(guard.len(), 0);
        assert!(!guard.is_applied(&receipt(9)));
    }

    #[test]
    #[should_panic(expected = "max_size must be > 0")]
    fn zero_max_size_panics() {
        let _ = ReceiptGuard::new(0);
    }
}
