//! Suppression of repeated job-finished lines

use std::collections::{HashSet, VecDeque};

/// Default number of signatures remembered
pub const DEFAULT_DEDUP_CAPACITY: usize = 1024;

/// Bounded set of recently seen signatures with FIFO eviction.
///
/// Lives in memory only; a restarted process starts empty.
#[derive(Debug)]
pub struct RecentSignatures {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl RecentSignatures {
    /// A capacity of zero disables suppression
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a signature; false if it was already seen
    pub fn insert(&mut self, signature: &str) -> bool {
        if self.capacity == 0 {
            return true;
        }
        if self.seen.contains(signature) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(signature.to_string());
        self.order.push_back(signature.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for RecentSignatures {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_rejected() {
        let mut recent = RecentSignatures::new(4);
        assert!(recent.insert("a"));
        assert!(!recent.insert("a"));
        assert!(recent.insert("b"));
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn test_oldest_is_evicted() {
        let mut recent = RecentSignatures::new(2);
        assert!(recent.insert("a"));
        assert!(recent.insert("b"));
        assert!(recent.insert("c"));
        assert_eq!(recent.len(), 2);
        // "a" fell out of the window
        assert!(recent.insert("a"));
        assert!(!recent.insert("c"));
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut recent = RecentSignatures::new(0);
        assert!(recent.insert("a"));
        assert!(recent.insert("a"));
        assert!(recent.is_empty());
    }
}
