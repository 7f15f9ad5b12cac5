use std::cmp::Ordering;
use std::collections::VecDeque;

use geo_traits::CoordTrait;
use tinyvec::TinyVec;
use tracing::{debug, trace};

use crate::error::{KdQuadError, Result};
use crate::kdtree::hyper_rect::HyperRectangle;
use crate::kdtree::traversal::Iter;
use crate::kdtree::{KdTreeNode, NearestNeighbourList};
use crate::r#type::{KeyNum, TypeMath};

/// How [`KdTree::add`] treats a point that is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateBehavior {
    /// Leave the stored value untouched and report that nothing was added.
    Skip,
    /// Fail with [`KdQuadError::DuplicateNode`].
    #[default]
    Error,
    /// Overwrite the stored value.
    Update,
}

/// A pointer-based k-d tree mapping K-dimensional points to values.
///
/// Nodes are inserted one at a time, cycling the comparison axis per level. Removal detaches
/// the matching subtree and re-inserts its descendants, so heavy removal can degrade the tree
/// shape; call [`KdTree::balance`] to rebuild it around per-axis medians.
#[derive(Debug)]
pub struct KdTree<K: KeyNum, V, M: TypeMath<K>> {
    root: Option<Box<KdTreeNode<K, V>>>,
    count: usize,
    dimensions: usize,
    math: M,
    duplicate_behavior: DuplicateBehavior,
}

type Link<K, V> = Option<Box<KdTreeNode<K, V>>>;

/// Pending work of a neighbour search.
#[derive(Debug, Clone)]
enum SearchFrame<'a, K, V> {
    /// Descend into a subtree bounded by `rect`.
    Visit {
        node: &'a KdTreeNode<K, V>,
        rect: HyperRectangle<K>,
        dimension: usize,
    },
    /// Descend into a far subtree unless it cannot hold a closer point.
    Far {
        node: &'a KdTreeNode<K, V>,
        rect: HyperRectangle<K>,
        dimension: usize,
    },
    /// Offer the node itself.
    Own { node: &'a KdTreeNode<K, V> },
}

impl<K: KeyNum, V, M: TypeMath<K>> KdTree<K, V, M> {
    /// Create an empty tree that rejects duplicate points.
    ///
    /// # Panics
    ///
    /// Panics if `dimensions` is zero.
    pub fn new(dimensions: usize, math: M) -> Self {
        Self::new_with_duplicate_behavior(dimensions, math, DuplicateBehavior::default())
    }

    /// Create an empty tree with the given policy for duplicate points.
    ///
    /// # Panics
    ///
    /// Panics if `dimensions` is zero.
    pub fn new_with_duplicate_behavior(
        dimensions: usize,
        math: M,
        duplicate_behavior: DuplicateBehavior,
    ) -> Self {
        assert!(dimensions > 0, "a k-d tree needs at least one dimension");
        Self {
            root: None,
            count: 0,
            dimensions,
            math,
            duplicate_behavior,
        }
    }

    /// The number of axes of every stored point.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The number of stored points.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the tree stores no points.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The numeric strategy of this tree.
    pub fn math(&self) -> &M {
        &self.math
    }

    #[allow(missing_docs)]
    pub fn duplicate_behavior(&self) -> DuplicateBehavior {
        self.duplicate_behavior
    }

    fn check_dimensions(&self, point: &[K]) -> Result<()> {
        if point.len() != self.dimensions {
            return Err(KdQuadError::InvalidArgument(format!(
                "point has {} dimensions, tree has {}",
                point.len(),
                self.dimensions
            )));
        }
        Ok(())
    }

    /// Insert `value` at `point`.
    ///
    /// Returns `Ok(false)` if the point was already stored and the tree skips duplicates.
    pub fn add(&mut self, point: &[K], value: V) -> Result<bool> {
        self.check_dimensions(point)?;

        let math = &self.math;
        let dimensions = self.dimensions;
        let mut slot = &mut self.root;
        let mut dimension = 0;

        while let Some(node) = slot {
            if math.points_equal(point, &node.point) {
                return match self.duplicate_behavior {
                    DuplicateBehavior::Skip => Ok(false),
                    DuplicateBehavior::Update => {
                        node.value = value;
                        Ok(true)
                    }
                    DuplicateBehavior::Error => Err(KdQuadError::DuplicateNode),
                };
            }

            let ordering = math.compare(point[dimension], node.point[dimension]);
            dimension = (dimension + 1) % dimensions;
            slot = node.child_mut(ordering);
        }

        *slot = Some(Box::new(KdTreeNode::new(point.to_vec(), value)));
        self.count += 1;
        Ok(true)
    }

    /// Attach a detached, childless node below the existing structure.
    ///
    /// The node's point must not already be stored.
    fn relink(&mut self, node: Box<KdTreeNode<K, V>>) {
        debug_assert!(node.is_leaf());

        let math = &self.math;
        let dimensions = self.dimensions;
        let mut slot = &mut self.root;
        let mut dimension = 0;

        while let Some(current) = slot {
            let ordering = math.compare(node.point[dimension], current.point[dimension]);
            dimension = (dimension + 1) % dimensions;
            slot = current.child_mut(ordering);
        }

        *slot = Some(node);
        self.count += 1;
    }

    /// Remove the point and return its value.
    ///
    /// Every descendant of the removed node is re-inserted. Removing a point that is not stored
    /// is a no-op.
    pub fn remove(&mut self, point: &[K]) -> Result<Option<V>> {
        self.check_dimensions(point)?;

        let Some(mut removed) = self.detach(point) else {
            return Ok(None);
        };
        self.count -= 1;

        // Stage the descendants breadth first to keep their relative insertion order
        let (left, right) = removed.take_children();
        let mut queue: VecDeque<Box<KdTreeNode<K, V>>> = left.into_iter().chain(right).collect();
        let mut staged = Vec::with_capacity(queue.len());
        while let Some(mut node) = queue.pop_front() {
            let (left, right) = node.take_children();
            queue.extend(left);
            queue.extend(right);
            staged.push(node);
        }

        if !staged.is_empty() {
            trace!(nodes = staged.len(), "re-inserting detached subtree");
        }
        self.count -= staged.len();
        for node in staged {
            self.relink(node);
        }

        let KdTreeNode { value, .. } = *removed;
        Ok(Some(value))
    }

    /// Unlink the node stored at `point` from its parent, together with its subtree.
    fn detach(&mut self, point: &[K]) -> Link<K, V> {
        let math = &self.math;
        let dimensions = self.dimensions;

        if self
            .root
            .as_ref()
            .is_some_and(|root| math.points_equal(point, &root.point))
        {
            return self.root.take();
        }

        let mut node = self.root.as_mut()?;
        let mut dimension = 0;
        loop {
            let ordering = math.compare(point[dimension], node.point[dimension]);
            dimension = (dimension + 1) % dimensions;

            let slot = node.child_mut(ordering);
            if slot
                .as_ref()
                .is_some_and(|child| math.points_equal(point, &child.point))
            {
                return slot.take();
            }
            node = slot.as_mut()?;
        }
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        // Iterative so that list-shaped trees do not exhaust the stack on drop
        let mut stack: Vec<Box<KdTreeNode<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            let (left, right) = node.take_children();
            stack.extend(left);
            stack.extend(right);
        }
        self.count = 0;
    }

    /// Rebuild the tree so that every subtree is rooted at the median of its points along the
    /// axis of its level.
    pub fn balance(&mut self) {
        if self.root.is_none() {
            return;
        }

        let mut nodes = Vec::with_capacity(self.count);
        let mut queue: VecDeque<Box<KdTreeNode<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = queue.pop_front() {
            let (left, right) = node.take_children();
            queue.extend(left);
            queue.extend(right);
            nodes.push(node);
        }
        self.count = 0;

        let total = nodes.len();
        self.add_balanced(nodes, 0);
        debug!(nodes = total, dimensions = self.dimensions, "balanced k-d tree");
    }

    fn add_balanced(&mut self, mut nodes: Vec<Box<KdTreeNode<K, V>>>, dimension: usize) {
        if nodes.is_empty() {
            return;
        }

        let math = &self.math;
        // Stable, so equal keys keep their collected order
        nodes.sort_by(|a, b| math.compare(a.point[dimension], b.point[dimension]));

        let mid = (nodes.len() + 1) / 2 - 1;
        let upper = nodes.split_off(mid + 1);
        let Some(median) = nodes.pop() else {
            return;
        };
        self.relink(median);

        let next_dimension = (dimension + 1) % self.dimensions;
        self.add_balanced(nodes, next_dimension);
        self.add_balanced(upper, next_dimension);
    }

    /// The value stored at `point`, or `None` if the point is absent or has the wrong number of
    /// dimensions.
    pub fn find_value_at(&self, point: &[K]) -> Option<&V> {
        self.try_find_value_at(point).ok().flatten()
    }

    /// The value stored at `point`.
    ///
    /// Returns [`KdQuadError::InvalidArgument`] if `point` has the wrong number of dimensions.
    pub fn try_find_value_at(&self, point: &[K]) -> Result<Option<&V>> {
        self.check_dimensions(point)?;

        let mut current = self.root.as_deref();
        let mut dimension = 0;
        while let Some(node) = current {
            if self.math.points_equal(point, &node.point) {
                return Ok(Some(&node.value));
            }
            let ordering = self.math.compare(point[dimension], node.point[dimension]);
            dimension = (dimension + 1) % self.dimensions;
            current = node.child(ordering);
        }
        Ok(None)
    }

    /// Iterate over every node, root first, left subtrees before right subtrees.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref())
    }

    /// Find the `max_results` nodes within `radius` of `point`, nearest first.
    ///
    /// Passing `None` returns every node within the radius.
    pub fn radial_search(
        &self,
        point: &[K],
        radius: K,
        max_results: Option<usize>,
    ) -> Result<Vec<&KdTreeNode<K, V>>> {
        self.check_dimensions(point)?;

        let mut neighbours = match max_results {
            Some(max_results) => NearestNeighbourList::new_with_capacity(&self.math, max_results),
            None => NearestNeighbourList::new(&self.math),
        };
        if let Some(root) = self.root.as_deref() {
            self.add_nearest_neighbours(
                root,
                point,
                &mut neighbours,
                self.math.multiply(radius, radius),
            )?;
        }
        Ok(Self::into_nearest_first(neighbours))
    }

    /// Find the `max_results` nodes closest to `point`, nearest first.
    ///
    /// Passing `None` orders every node in the tree by distance.
    pub fn nearest_neighbours(
        &self,
        point: &[K],
        max_results: Option<usize>,
    ) -> Result<Vec<&KdTreeNode<K, V>>> {
        self.check_dimensions(point)?;

        let max_results = max_results.unwrap_or(self.count).min(self.count);
        let Some(root) = self.root.as_deref() else {
            return Ok(vec![]);
        };
        if max_results == 0 {
            return Ok(vec![]);
        }

        let mut neighbours = NearestNeighbourList::new_with_capacity(&self.math, max_results);
        self.add_nearest_neighbours(root, point, &mut neighbours, self.math.max_value())?;
        Ok(Self::into_nearest_first(neighbours))
    }

    /// [`KdTree::nearest_neighbours`] for a two dimensional tree, queried with any `geo-traits`
    /// coordinate.
    pub fn nearest_neighbours_coord(
        &self,
        coord: &impl CoordTrait<T = K>,
        max_results: Option<usize>,
    ) -> Result<Vec<&KdTreeNode<K, V>>> {
        self.nearest_neighbours(&[coord.x(), coord.y()], max_results)
    }

    fn add_nearest_neighbours<'a>(
        &'a self,
        root: &'a KdTreeNode<K, V>,
        target: &[K],
        neighbours: &mut NearestNeighbourList<&'a KdTreeNode<K, V>, K, &'a M>,
        max_radius_squared: K,
    ) -> Result<()> {
        let math = &self.math;

        // Use TinyVec to avoid heap allocations for shallow trees
        let mut stack: TinyVec<[Option<SearchFrame<'a, K, V>>; 32]> = TinyVec::new();
        stack.push(Some(SearchFrame::Visit {
            node: root,
            rect: HyperRectangle::infinite(self.dimensions, math),
            dimension: 0,
        }));

        // Frames pop near side first, then the far side, then the node itself
        while let Some(frame) = stack.pop().flatten() {
            match frame {
                SearchFrame::Visit {
                    node,
                    rect,
                    dimension,
                } => {
                    let (lower, upper) = rect.split(dimension, node.point[dimension]);
                    let ordering = math.compare(target[dimension], node.point[dimension]);
                    let (near_rect, far_rect, far_ordering) = match ordering {
                        Ordering::Greater => (upper, lower, Ordering::Less),
                        _ => (lower, upper, Ordering::Greater),
                    };
                    let next_dimension = (dimension + 1) % self.dimensions;

                    stack.push(Some(SearchFrame::Own { node }));
                    if let Some(far) = node.child(far_ordering) {
                        stack.push(Some(SearchFrame::Far {
                            node: far,
                            rect: far_rect,
                            dimension: next_dimension,
                        }));
                    }
                    if let Some(near) = node.child(ordering) {
                        stack.push(Some(SearchFrame::Visit {
                            node: near,
                            rect: near_rect,
                            dimension: next_dimension,
                        }));
                    }
                }
                SearchFrame::Far {
                    node,
                    rect,
                    dimension,
                } => {
                    let closest = rect.closest_point(target, math);
                    let distance = math.distance_squared_between_points(&closest, target)?;
                    if math.compare(distance, max_radius_squared) == Ordering::Greater {
                        continue;
                    }
                    let could_improve = match neighbours.get_furthest_distance() {
                        Ok(furthest) if neighbours.is_at_capacity() => {
                            math.compare(distance, furthest) == Ordering::Less
                        }
                        _ => !neighbours.is_at_capacity(),
                    };
                    if could_improve {
                        stack.push(Some(SearchFrame::Visit {
                            node,
                            rect,
                            dimension,
                        }));
                    }
                }
                SearchFrame::Own { node } => {
                    let distance = math.distance_squared_between_points(&node.point, target)?;
                    if math.compare(distance, max_radius_squared) != Ordering::Greater {
                        neighbours.add(node, distance);
                    }
                }
            }
        }
        Ok(())
    }

    fn into_nearest_first<'a>(
        mut neighbours: NearestNeighbourList<&'a KdTreeNode<K, V>, K, &'a M>,
    ) -> Vec<&'a KdTreeNode<K, V>> {
        let mut nodes = Vec::with_capacity(neighbours.len());
        while let Ok(node) = neighbours.remove_furthest() {
            nodes.push(node);
        }
        nodes.reverse();
        nodes
    }
}

impl<K: KeyNum, V: PartialEq, M: TypeMath<K>> KdTree<K, V, M> {
    /// The point of the first node, in breadth-first order, holding `value`.
    ///
    /// This scans the whole tree.
    pub fn try_find_value(&self, value: &V) -> Option<&[K]> {
        let mut queue: VecDeque<&KdTreeNode<K, V>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = queue.pop_front() {
            if node.value == *value {
                return Some(node.point());
            }
            queue.extend(node.left.as_deref());
            queue.extend(node.right.as_deref());
        }
        None
    }

    /// Like [`KdTree::try_find_value`], returning an empty point when `value` is absent.
    pub fn find_value(&self, value: &V) -> &[K] {
        self.try_find_value(value).unwrap_or(&[])
    }
}

impl<K: KeyNum, V, M: TypeMath<K>> Drop for KdTree<K, V, M> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a, K: KeyNum, V, M: TypeMath<K>> IntoIterator for &'a KdTree<K, V, M> {
    type Item = &'a KdTreeNode<K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
