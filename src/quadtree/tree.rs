use std::hash::Hash;

use geo_traits::RectTrait;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::bbox::{BoundingBox, SINGLE_POINT_BUFFER};
use crate::error::{KdQuadError, Result};
use crate::quadtree::node::QuadTreeNode;

/// A region quadtree over items with 2D bounding boxes.
///
/// The root is a square sized from the first box it sees and grows whenever an item falls
/// outside it. Every tracked item is also kept in a flat map so that it can be removed by
/// identity and re-inserted when the root grows.
#[derive(Debug, Clone)]
pub struct QuadTree<T: Eq + Hash + Clone> {
    max_items_per_node: usize,
    root: Option<QuadTreeNode<T>>,
    items: IndexMap<T, BoundingBox>,
}

impl<T: Eq + Hash + Clone> QuadTree<T> {
    /// The node capacity used by [`QuadTree::new`].
    pub const DEFAULT_MAX_ITEMS_PER_NODE: usize = 8;

    /// Create an empty tree with the default node capacity.
    pub fn new() -> Self {
        Self::new_with_max_items(Self::DEFAULT_MAX_ITEMS_PER_NODE)
    }

    /// Create an empty tree whose leaves split once they hold more than `max_items_per_node`
    /// items.
    pub fn new_with_max_items(max_items_per_node: usize) -> Self {
        Self {
            max_items_per_node,
            root: None,
            items: IndexMap::new(),
        }
    }

    /// Create an empty tree whose root already covers `envelope`.
    pub fn new_with_envelope(envelope: &BoundingBox, max_items_per_node: usize) -> Self {
        Self {
            root: Some(QuadTreeNode::new_square(envelope, max_items_per_node)),
            ..Self::new_with_max_items(max_items_per_node)
        }
    }

    /// Create an empty tree whose root already covers the given bounds.
    pub fn new_with_bounds(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        max_items_per_node: usize,
    ) -> Result<Self> {
        let envelope = BoundingBox::new(min_x, min_y, max_x, max_y)?;
        Ok(Self::new_with_envelope(&envelope, max_items_per_node))
    }

    #[allow(missing_docs)]
    pub fn max_items_per_node(&self) -> usize {
        self.max_items_per_node
    }

    /// The envelope of the root node, if one exists yet.
    pub fn root_envelope(&self) -> Option<&BoundingBox> {
        self.root.as_ref().map(|root| &root.envelope)
    }

    /// The number of tracked items.
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.count)
    }

    /// Returns `true` if no items are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every tracked item, in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.items.keys()
    }

    /// Every tracked item with the box it was added with, in insertion order.
    pub fn items_with_bounds(&self) -> impl Iterator<Item = (&T, &BoundingBox)> {
        self.items.iter()
    }

    /// Track `item` with the bounding box `bb`.
    ///
    /// Returns [`KdQuadError::DuplicateItem`] if `item` is already tracked.
    pub fn add(&mut self, item: T, bb: BoundingBox) -> Result<()> {
        if self.items.contains_key(&item) {
            return Err(KdQuadError::DuplicateItem);
        }

        let max_items = self.max_items_per_node;
        let root = self
            .root
            .get_or_insert_with(|| QuadTreeNode::new_square(&bb, max_items));
        let env = root.envelope;
        if !(env.contains(bb.min_x(), bb.min_y()) && env.contains(bb.max_x(), bb.max_y())) {
            self.grow_to_contain(&bb);
        }

        if let Some(root) = self.root.as_mut() {
            root.add(item.clone(), bb);
        }
        self.items.insert(item, bb);
        Ok(())
    }

    /// Track `item` with the box spanning the given bounds.
    pub fn add_bounds(
        &mut self,
        item: T,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<()> {
        self.add(item, BoundingBox::new(min_x, min_y, max_x, max_y)?)
    }

    /// Track `item` with the extent of any `geo-traits` rectangle.
    pub fn add_rect(&mut self, item: T, rect: &impl RectTrait<T = f64>) -> Result<()> {
        self.add(item, BoundingBox::from_rect(rect)?)
    }

    /// Replace the root with a larger square covering both the current root and `bb`, and
    /// re-insert every tracked item.
    fn grow_to_contain(&mut self, bb: &BoundingBox) {
        let Some(root) = self.root.as_ref() else {
            return;
        };

        let expanded = root.envelope.expand_to_include(bb);
        let expanded = expanded.buffer(expanded.width().max(expanded.height()));

        let mut new_root = QuadTreeNode::new_square(&expanded, self.max_items_per_node);
        for (item, item_bb) in &self.items {
            new_root.add(item.clone(), *item_bb);
        }

        debug!(
            items = self.items.len(),
            min_x = new_root.envelope.min_x(),
            min_y = new_root.envelope.min_y(),
            max_x = new_root.envelope.max_x(),
            max_y = new_root.envelope.max_y(),
            "grew quadtree root"
        );
        self.root = Some(new_root);
    }

    /// Stop tracking `item`.
    ///
    /// Returns `false` if the item was not tracked.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(bb) = self.items.swap_remove(item) else {
            return false;
        };
        if let Some(root) = self.root.as_mut() {
            root.remove(item, &bb);
        }
        true
    }

    /// Every item whose box intersects `bb`.
    ///
    /// An item stored in several nodes is returned once per node.
    pub fn query_non_distinct(&self, bb: &BoundingBox) -> Vec<&T> {
        let mut results = vec![];
        if let Some(root) = self.root.as_ref().filter(|root| root.count > 0) {
            root.query(bb, &mut results);
        }
        results
    }

    /// [`QuadTree::query_non_distinct`] at a single position.
    pub fn query_non_distinct_point(&self, x: f64, y: f64) -> Vec<&T> {
        self.query_non_distinct(&BoundingBox::from_point(x, y, SINGLE_POINT_BUFFER))
    }

    /// Every item whose box intersects `bb`, each returned once.
    pub fn query_distinct(&self, bb: &BoundingBox) -> Vec<&T> {
        let distinct: IndexSet<&T> = self.query_non_distinct(bb).into_iter().collect();
        distinct.into_iter().collect()
    }

    /// [`QuadTree::query_distinct`] at a single position.
    pub fn query_distinct_point(&self, x: f64, y: f64) -> Vec<&T> {
        self.query_distinct(&BoundingBox::from_point(x, y, SINGLE_POINT_BUFFER))
    }

    /// [`QuadTree::query_distinct`] with any `geo-traits` rectangle.
    pub fn query_rect(&self, rect: &impl RectTrait<T = f64>) -> Result<Vec<&T>> {
        Ok(self.query_distinct(&BoundingBox::from_rect(rect)?))
    }
}

impl<T: Eq + Hash + Clone> Default for QuadTree<T> {
    fn default() -> Self {
        Self::new()
    }
}
