use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fpnav_core::Fp;

/// An entry popped from a [`MinHeap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapEntry<T> {
    pub item: T,
    pub expected_cost: Fp,
}

#[derive(Clone, Copy, Debug)]
struct Slot<T> {
    entry: HeapEntry<T>,
    seq: u64,
}

impl<T> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq && self.entry.expected_cost == other.entry.expected_cost
    }
}

impl<T> Eq for Slot<T> {}

impl<T> Ord for Slot<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops the smallest cost first, and
        // the earliest insertion among equal costs.
        other
            .entry
            .expected_cost
            .cmp(&self.entry.expected_cost)
            .then(other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Slot<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Search frontier ordered by expected total cost.
///
/// Entries with equal cost pop in insertion order, so a search driven by this
/// heap is reproducible on every machine.
#[derive(Clone, Debug)]
pub struct MinHeap<T> {
    heap: BinaryHeap<Slot<T>>,
    seq: u64,
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    pub fn push(&mut self, expected_cost: Fp, item: T) {
        self.heap.push(Slot {
            entry: HeapEntry {
                item,
                expected_cost,
            },
            seq: self.seq,
        });
        self.seq += 1;
    }

    /// Remove and return the cheapest entry.
    pub fn pop(&mut self) -> Option<HeapEntry<T>> {
        self.heap.pop().map(|slot| slot.entry)
    }

    pub fn peek(&self) -> Option<&HeapEntry<T>> {
        self.heap.peek().map(|slot| &slot.entry)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every entry and restart the insertion sequence. Keeps capacity.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_cheapest_first() {
        let mut h = MinHeap::new();
        h.push(Fp::from_int(5), 'a');
        h.push(Fp::from_int(1), 'b');
        h.push(Fp::from_int(3), 'c');
        assert_eq!(h.peek().map(|e| e.item), Some('b'));
        let order: Vec<char> = std::iter::from_fn(|| h.pop().map(|e| e.item)).collect();
        assert_eq!(order, vec!['b', 'c', 'a']);
        assert!(h.is_empty());
    }

    #[test]
    fn ties_pop_in_insertion_order() {
        let mut h = MinHeap::new();
        for item in 0..10 {
            h.push(Fp::ONE, item);
        }
        h.push(Fp::ZERO, 99);
        assert_eq!(h.pop().map(|e| e.item), Some(99));
        let order: Vec<i32> = std::iter::from_fn(|| h.pop().map(|e| e.item)).collect();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn clear_resets() {
        let mut h = MinHeap::new();
        h.push(Fp::ONE, 1);
        h.push(Fp::TWO, 2);
        h.clear();
        assert_eq!(h.len(), 0);
        assert_eq!(h.pop(), None);
    }
}
