//! Bounded, newest-first presentation buffers

use std::collections::VecDeque;

use crate::filter::{Filterable, FilterState};

/// Records kept per buffer, and the upper bound for any custom capacity
pub const DEFAULT_BUFFER_CAPACITY: usize = 50;

/// Newest-first buffer of the most recent accepted records
///
/// Insertion order is the only ordering: nothing is re-sorted by time or
/// value, and records leave only by ageing out of the tail.
#[derive(Debug, Clone)]
pub struct PresentationBuffer<T> {
    capacity: usize,
    records: VecDeque<T>,
}

impl<T> PresentationBuffer<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Capacity is clamped to `1..=DEFAULT_BUFFER_CAPACITY`
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, DEFAULT_BUFFER_CAPACITY);
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record
    pub fn front(&self) -> Option<&T> {
        self.records.front()
    }

    /// Records newest-first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }
}

impl<T: Clone> PresentationBuffer<T> {
    /// Owned copy of the records, newest-first
    pub fn snapshot(&self) -> Vec<T> {
        self.records.iter().cloned().collect()
    }
}

impl<T: Filterable> PresentationBuffer<T> {
    /// Insert `record` at the front if `filter` accepts it.
    ///
    /// Returns whether the record was inserted.
    pub fn push(&mut self, record: T, filter: &FilterState) -> bool {
        if !record.is_accepted_by(filter) {
            return false;
        }

        self.records.push_front(record);
        while self.records.len() > self.capacity {
            self.records.pop_back();
        }
        true
    }
}

impl<T> Default for PresentationBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
