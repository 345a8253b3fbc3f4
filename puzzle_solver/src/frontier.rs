//! Frontier structures for the search drivers.
//!
//! Each algorithm differs mainly in the order it pops pending nodes, so the
//! drivers in [`crate::solver`] are written against the [`Frontier`] trait and
//! handed one of the implementations below.
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Pending items awaiting expansion.
pub(crate) trait Frontier<T> {
    /// Adds an item. `score` is ignored by frontiers that are not ordered by score.
    fn push(&mut self, item: T, score: f64);

    /// Removes the next item to expand.
    fn pop(&mut self) -> Option<T>;

    fn len(&self) -> usize;
}

/// First in, first out. Used by breadth-first search.
pub(crate) struct FifoFrontier<T> {
    queue: VecDeque<T>,
}

impl<T> FifoFrontier<T> {
    pub(crate) fn new() -> Self {
        FifoFrontier {
            queue: VecDeque::new(),
        }
    }
}

impl<T> Frontier<T> for FifoFrontier<T> {
    fn push(&mut self, item: T, _score: f64) {
        self.queue.push_back(item);
    }

    fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Last in, first out. Used by depth-first search.
pub(crate) struct LifoFrontier<T> {
    stack: Vec<T>,
}

impl<T> LifoFrontier<T> {
    pub(crate) fn new() -> Self {
        LifoFrontier { stack: Vec::new() }
    }
}

impl<T> Frontier<T> for LifoFrontier<T> {
    fn push(&mut self, item: T, _score: f64) {
        self.stack.push(item);
    }

    fn pop(&mut self) -> Option<T> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

struct Ranked<T> {
    score: f64,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    // BinaryHeap is a max-heap: the lowest score, then the oldest entry, must
    // compare greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Lowest score first; equal scores pop in insertion order.
/// Used by best-first search and to rank beam search candidates.
pub(crate) struct PriorityFrontier<T> {
    heap: BinaryHeap<Ranked<T>>,
    sequence: u64,
}

impl<T> PriorityFrontier<T> {
    pub(crate) fn new() -> Self {
        PriorityFrontier {
            heap: BinaryHeap::new(),
            sequence: 0,
        }
    }

    /// Removes the `count` best items in pop order and discards everything else.
    pub(crate) fn drain_best(&mut self, count: usize) -> Vec<T> {
        let mut best = Vec::with_capacity(count.min(self.heap.len()));
        while best.len() < count {
            match self.pop() {
                Some(item) => best.push(item),
                None => break,
            }
        }
        self.heap.clear();
        best
    }
}

impl<T> Frontier<T> for PriorityFrontier<T> {
    fn push(&mut self, item: T, score: f64) {
        self.heap.push(Ranked {
            score,
            sequence: self.sequence,
            item,
        });
        self.sequence += 1;
    }

    fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|ranked| ranked.item)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<F: Frontier<char>>(mut frontier: F) -> String {
        let mut out = String::new();
        while let Some(c) = frontier.pop() {
            out.push(c);
        }
        out
    }

    #[test]
    fn test_fifo_order() {
        let mut f = FifoFrontier::new();
        for (c, score) in [('a', 3.0), ('b', 1.0), ('c', 2.0)] {
            f.push(c, score);
        }
        assert_eq!(f.len(), 3);
        assert_eq!(drain(f), "abc");
    }

    #[test]
    fn test_lifo_order() {
        let mut f = LifoFrontier::new();
        for (c, score) in [('a', 3.0), ('b', 1.0), ('c', 2.0)] {
            f.push(c, score);
        }
        assert_eq!(drain(f), "cba");
    }

    #[test]
    fn test_priority_order_and_ties() {
        let mut f = PriorityFrontier::new();
        for (c, score) in [('a', 2.0), ('b', 1.0), ('c', 2.0), ('d', f64::INFINITY), ('e', 0.5), ('f', 1.0)] {
            f.push(c, score);
        }
        assert_eq!(drain(f), "ebfacd");
    }

    #[test]
    fn test_drain_best_keeps_lowest_and_clears() {
        let mut f = PriorityFrontier::new();
        for (c, score) in [('a', 5.0), ('b', 1.0), ('c', 3.0), ('d', 2.0)] {
            f.push(c, score);
        }
        assert_eq!(f.drain_best(2), vec!['b', 'd']);
        assert_eq!(f.len(), 0);

        f.push('x', 1.0);
        assert_eq!(f.drain_best(10), vec!['x']);
    }
}
