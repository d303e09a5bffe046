//! Fixed-capacity ring buffer
//!
//! Keeps the most recent `capacity` items. Storage is allocated once and
//! the oldest item is dropped when a new one arrives on a full buffer.

use std::collections::VecDeque;

/// Ring buffer holding the newest `capacity` items, oldest first
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push an item, evicting the oldest one when full
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Items currently held, oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    /// Number of items written and still held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing has been pushed yet
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of items held
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the buffer has wrapped at least once
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Drop all items, keeping the allocation
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy out the held items, oldest to newest
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled(n: u32) -> RingBuffer<u32> {
        let mut buffer = RingBuffer::new(5);
        for i in 1..=n {
            buffer.push(i);
        }
        buffer
    }

    #[test]
    fn test_single_item() {
        assert_eq!(filled(1).to_vec(), vec![1]);
    }

    #[test]
    fn test_partial_fill_reports_only_written() {
        let buffer = filled(2);
        assert_eq!(buffer.to_vec(), vec![1, 2]);
        assert_eq!(buffer.len(), 2);
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_wraps_once() {
        assert_eq!(filled(6).to_vec(), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_wraps_past_capacity() {
        let buffer = filled(9);
        assert_eq!(buffer.to_vec(), vec![5, 6, 7, 8, 9]);
        assert_eq!(buffer.capacity(), 5);
        assert!(buffer.is_full());
    }

    #[test]
    fn test_zero_capacity() {
        let mut buffer = RingBuffer::new(0);
        buffer.push('a');
        buffer.push('b');
        assert_eq!(buffer.to_vec(), vec!['b']);
    }
}
