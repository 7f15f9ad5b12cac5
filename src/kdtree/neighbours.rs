use std::cmp::Ordering;

use crate::error::Result;
use crate::kdtree::PriorityQueue;
use crate::r#type::{KeyNum, TypeMath};

/// A fixed-capacity collection that keeps the closest items offered to it.
///
/// The furthest kept item is evicted when a strictly closer one arrives at capacity.
#[derive(Debug, Clone)]
pub struct NearestNeighbourList<T, D: KeyNum, M: TypeMath<D>> {
    maximum_capacity: usize,
    queue: PriorityQueue<T, D, M>,
}

impl<T, D: KeyNum, M: TypeMath<D>> NearestNeighbourList<T, D, M> {
    /// Create a list without an upper bound on the number of items.
    pub fn new(math: M) -> Self {
        Self {
            maximum_capacity: usize::MAX,
            queue: PriorityQueue::new(math),
        }
    }

    /// Create a list keeping at most `maximum_capacity` items.
    pub fn new_with_capacity(math: M, maximum_capacity: usize) -> Self {
        Self {
            maximum_capacity,
            queue: PriorityQueue::new_with_capacity(math, maximum_capacity),
        }
    }

    /// The maximum number of items kept.
    pub fn maximum_capacity(&self) -> usize {
        self.maximum_capacity
    }

    /// The number of items currently kept.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if the list keeps no items.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns `true` if the list holds `maximum_capacity` items.
    pub fn is_at_capacity(&self) -> bool {
        self.len() == self.maximum_capacity
    }

    /// Offer an item at the given distance.
    ///
    /// Returns `true` if the item was kept.
    pub fn add(&mut self, item: T, distance: D) -> bool {
        if self.len() < self.maximum_capacity {
            self.queue.enqueue(item, distance);
            return true;
        }

        match self.queue.get_highest_priority() {
            Ok(furthest) if self.queue.math().compare(distance, furthest) == Ordering::Less => {
                match self.queue.dequeue() {
                    Ok(_) => {
                        self.queue.enqueue(item, distance);
                        true
                    }
                    Err(_) => false,
                }
            }
            _ => false,
        }
    }

    /// The furthest item kept.
    pub fn get_furthest(&self) -> Result<&T> {
        self.queue.get_highest()
    }

    /// The distance of the furthest item kept.
    pub fn get_furthest_distance(&self) -> Result<D> {
        self.queue.get_highest_priority()
    }

    /// Remove and return the furthest item kept.
    pub fn remove_furthest(&mut self) -> Result<T> {
        self.queue.dequeue()
    }
}
