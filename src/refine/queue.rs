use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use super::TriangleId;

/// A popped queue entry. It may be stale: the scheduler checks the id
/// against the live set before acting on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueEntry {
    pub error: f64,
    pub id: TriangleId,
}

/// Max-priority queue of triangles keyed by error.
///
/// Retired triangles are never removed; their entries are skipped lazily
/// when popped. Ties pop the oldest triangle first.
#[derive(Debug, Clone, Default)]
pub struct RefinementQueue {
    heap: BinaryHeap<(OrderedFloat<f64>, Reverse<TriangleId>)>,
}

impl RefinementQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: TriangleId, error: f64) {
        self.heap.push((OrderedFloat(error), Reverse(id)));
    }

    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.heap
            .pop()
            .map(|(OrderedFloat(error), Reverse(id))| QueueEntry { error, id })
    }

    /// Error of the entry `pop` would return next.
    pub fn peek_error(&self) -> Option<f64> {
        self.heap.peek().map(|(e, _)| e.0)
    }

    /// Number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_pops_highest_error_first() {
        let mut queue = RefinementQueue::new();
        queue.push(0, 1.0);
        queue.push(1, 5.0);
        queue.push(2, 3.0);

        assert_eq!(queue.peek_error(), Some(5.0));
        assert_eq!(queue.pop(), Some(QueueEntry { error: 5.0, id: 1 }));
        assert_eq!(queue.pop(), Some(QueueEntry { error: 3.0, id: 2 }));
        assert_eq!(queue.pop(), Some(QueueEntry { error: 1.0, id: 0 }));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_ties_pop_oldest_first() {
        let mut queue = RefinementQueue::new();
        for id in [4, 2, 9] {
            queue.push(id, 7.0);
        }
        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|e| e.id).collect();
        assert_eq!(order, vec![2, 4, 9]);
    }

    #[test]
    fn test_live_pops_are_non_increasing() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut queue = RefinementQueue::new();
        let mut live = FxHashSet::default();

        for id in 0..500u64 {
            queue.push(id, rng.gen_range(0.0..100.0));
            live.insert(id);
        }
        // Retire a third of them without touching the heap.
        for id in (0..500u64).step_by(3) {
            live.remove(&id);
        }

        let mut last = f64::INFINITY;
        let mut seen = 0;
        let mut stale = 0;
        while let Some(entry) = queue.pop() {
            if !live.contains(&entry.id) {
                stale += 1;
                continue;
            }
            assert!(entry.error <= last, "{} popped after {}", entry.error, last);
            last = entry.error;
            seen += 1;
        }
        assert_eq!(stale, 167);
        assert_eq!(seen, 333);
    }
}
