use std::cmp::Ordering;

use crate::error::{KdQuadError, Result};
use crate::r#type::{KeyNum, TypeMath};

/// Upper bound on the slots allocated up front, however large the requested capacity.
const MAX_PREALLOCATED: usize = 1024;

#[derive(Debug, Clone)]
struct PriorityItem<T, P> {
    item: T,
    priority: P,
}

/// A queue that always yields the item with the highest priority first.
///
/// Items are kept in a flat array sorted by descending priority, so enqueue and dequeue are
/// `O(n)` linear shifts. This is a good fit for the small, bounded neighbour lists built during
/// k-d tree searches; it is not intended as a general purpose heap.
///
/// Items with equal priority are dequeued in insertion order.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T, P: KeyNum, M: TypeMath<P>> {
    queue: Vec<PriorityItem<T, P>>,
    capacity: usize,
    math: M,
}

impl<T, P: KeyNum, M: TypeMath<P>> PriorityQueue<T, P, M> {
    /// The capacity used by [`PriorityQueue::new`].
    pub const DEFAULT_CAPACITY: usize = 4;

    /// Create a new queue with the default initial capacity.
    pub fn new(math: M) -> Self {
        Self::new_with_capacity(math, Self::DEFAULT_CAPACITY)
    }

    /// Create a new queue with the provided initial capacity.
    ///
    /// The queue grows past this capacity by doubling it.
    pub fn new_with_capacity(math: M, capacity: usize) -> Self {
        Self {
            queue: Vec::with_capacity(capacity.min(MAX_PREALLOCATED)),
            capacity,
            math,
        }
    }

    /// The current capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of items in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The numeric strategy used to compare priorities.
    pub fn math(&self) -> &M {
        &self.math
    }

    fn expand_capacity(&mut self) {
        self.capacity = self.capacity.saturating_mul(2).max(1);
        let additional = self.capacity.saturating_sub(self.queue.len());
        self.queue.reserve(additional.min(MAX_PREALLOCATED));
    }

    /// Add an item to the queue.
    ///
    /// The new item is shifted towards the front past every item of strictly lower priority.
    pub fn enqueue(&mut self, item: T, priority: P) {
        if self.queue.len() + 1 > self.capacity {
            self.expand_capacity();
        }

        self.queue.push(PriorityItem { item, priority });

        let mut index = self.queue.len() - 1;
        while index > 0
            && self
                .math
                .compare(self.queue[index].priority, self.queue[index - 1].priority)
                == Ordering::Greater
        {
            self.queue.swap(index, index - 1);
            index -= 1;
        }
    }

    /// Remove and return the item with the highest priority.
    pub fn dequeue(&mut self) -> Result<T> {
        if self.queue.is_empty() {
            return Err(KdQuadError::EmptyCollection);
        }
        Ok(self.queue.remove(0).item)
    }

    /// The item with the highest priority.
    pub fn get_highest(&self) -> Result<&T> {
        self.queue
            .first()
            .map(|entry| &entry.item)
            .ok_or(KdQuadError::EmptyCollection)
    }

    /// The priority of the item with the highest priority.
    pub fn get_highest_priority(&self) -> Result<P> {
        self.queue
            .first()
            .map(|entry| entry.priority)
            .ok_or(KdQuadError::EmptyCollection)
    }
}
