//! Array-backed binary min-heap with an explicit comparison function.

use std::cmp::Ordering;

/// Binary min-heap ordered by a comparison function.
///
/// Unlike [`std::collections::BinaryHeap`] the order is not taken from an `Ord` implementation, so
/// the merger can use a tie-break that is not part of the item type. The heap never allocates once
/// its capacity covers the number of items.
pub struct MinHeap<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    items: Vec<T>,
    compare: F,
}

impl<T, F> MinHeap<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty heap able to hold `capacity` items without reallocation.
    pub fn with_capacity(capacity: usize, compare: F) -> Self {
        MinHeap {
            items: Vec::with_capacity(capacity),
            compare,
        }
    }

    /// Builds a heap from unordered items in linear time.
    pub fn from_vec(items: Vec<T>, compare: F) -> Self {
        let mut heap = MinHeap { items, compare };
        for idx in (0..heap.items.len() / 2).rev() {
            heap.sift_down(idx);
        }
        heap
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the minimum item.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Removes and returns the minimum item.
    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }

        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let item = self.items.pop();
        self.sift_down(0);

        item
    }

    /// Replaces the minimum item with `item` and restores the heap order.
    /// Returns the replaced item. Cheaper than a `pop` followed by a `push`.
    pub fn replace_top(&mut self, item: T) -> Option<T> {
        if self.items.is_empty() {
            self.items.push(item);
            return None;
        }

        let top = std::mem::replace(&mut self.items[0], item);
        self.sift_down(0);

        Some(top)
    }

    fn less(&self, a: usize, b: usize) -> bool {
        (self.compare)(&self.items[a], &self.items[b]) == Ordering::Less
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.less(idx, parent) {
                break;
            }
            self.items.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let child = if right < len && self.less(right, left) { right } else { left };

            if !self.less(child, idx) {
                break;
            }
            self.items.swap(idx, child);
            idx = child;
        }
    }
}
