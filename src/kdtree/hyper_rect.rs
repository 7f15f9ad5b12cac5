use std::cmp::Ordering;

use crate::r#type::{KeyNum, TypeMath};

/// An axis-aligned K-dimensional region bounding the space below a k-d tree node during
/// neighbour searches.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HyperRectangle<K> {
    pub(crate) minimum_point: Vec<K>,
    pub(crate) maximum_point: Vec<K>,
}

impl<K: KeyNum> HyperRectangle<K> {
    /// A rectangle spanning negative to positive infinity on every axis.
    pub(crate) fn infinite(dimensions: usize, math: &impl TypeMath<K>) -> Self {
        Self {
            minimum_point: vec![math.negative_infinity(); dimensions],
            maximum_point: vec![math.positive_infinity(); dimensions],
        }
    }

    /// Split along `dimension` at `value` into the (lower, upper) halves.
    pub(crate) fn split(&self, dimension: usize, value: K) -> (Self, Self) {
        let mut lower = self.clone();
        lower.maximum_point[dimension] = value;
        let mut upper = self.clone();
        upper.minimum_point[dimension] = value;
        (lower, upper)
    }

    /// The point inside this rectangle closest to `point`, found by clamping each axis.
    pub(crate) fn closest_point(&self, point: &[K], math: &impl TypeMath<K>) -> Vec<K> {
        point
            .iter()
            .zip(self.minimum_point.iter().zip(&self.maximum_point))
            .map(|(&value, (&min, &max))| {
                if math.compare(min, value) == Ordering::Greater {
                    min
                } else if math.compare(max, value) == Ordering::Less {
                    max
                } else {
                    value
                }
            })
            .collect()
    }
}
