use std::hash::Hash;

use indexmap::IndexMap;
use tracing::trace;

use crate::bbox::BoundingBox;

/// Number of levels below the root past which nodes no longer split.
pub(crate) const MAX_DEPTH: usize = 32;

/// A node of a [`QuadTree`](crate::quadtree::QuadTree).
///
/// Items whose box covers the node's centroid and cannot be assigned to a single quadrant are
/// "large" and stay at this node. All other items are "small" and are pushed into every
/// intersecting child once the node splits.
#[derive(Debug, Clone)]
pub(crate) struct QuadTreeNode<T> {
    pub(crate) count: usize,
    centroid_x: f64,
    centroid_y: f64,
    max_items: usize,
    depth: usize,
    pub(crate) envelope: BoundingBox,
    pub(crate) children: Option<Box<[QuadTreeNode<T>; 4]>>,
    pub(crate) items_small: IndexMap<T, BoundingBox>,
    pub(crate) items_large: IndexMap<T, BoundingBox>,
}

impl<T: Eq + Hash + Clone> QuadTreeNode<T> {
    fn new(envelope: BoundingBox, max_items: usize, depth: usize) -> Self {
        Self {
            count: 0,
            centroid_x: envelope.centroid_x(),
            centroid_y: envelope.centroid_y(),
            max_items,
            depth,
            envelope,
            children: None,
            items_small: IndexMap::new(),
            items_large: IndexMap::new(),
        }
    }

    /// A root node: the square centred on `bb` whose side is the larger of its extents.
    pub(crate) fn new_square(bb: &BoundingBox, max_items: usize) -> Self {
        let side = bb.width().max(bb.height());
        let envelope = BoundingBox::from_point(bb.centroid_x(), bb.centroid_y(), side);
        Self::new(envelope, max_items, 0)
    }

    /// Returns `true` if `bb` must be stored at this node rather than pushed to the children.
    fn is_large(&self, bb: &BoundingBox) -> bool {
        if !bb.contains(self.centroid_x, self.centroid_y) {
            return false;
        }

        let env = &self.envelope;
        bb.contains(env.min_x(), env.min_y())
            || bb.contains(env.min_x(), env.max_y())
            || bb.contains(env.max_x(), env.max_y())
            || bb.contains(env.max_x(), env.min_y())
            // Narrow boxes crossing the whole node touch no corner
            || (bb.intersects(env) && (bb.width() > env.width() || bb.height() > env.height()))
    }

    pub(crate) fn add(&mut self, item: T, bb: BoundingBox) {
        self.count += 1;

        if self.is_large(&bb) {
            self.items_large.insert(item, bb);
            return;
        }

        match self.children.as_deref_mut() {
            Some(children) => Self::add_to_children(children, item, bb),
            None => {
                self.items_small.insert(item, bb);
                if self.items_small.len() > self.max_items && self.depth < MAX_DEPTH {
                    self.split();
                }
            }
        }
    }

    fn add_to_children(children: &mut [QuadTreeNode<T>; 4], item: T, bb: BoundingBox) {
        for child in children
            .iter_mut()
            .filter(|child| child.envelope.intersects(&bb))
        {
            child.add(item.clone(), bb);
        }
    }

    fn split(&mut self) {
        let env = self.envelope;
        let (cx, cy) = (self.centroid_x, self.centroid_y);
        let depth = self.depth + 1;
        let max_items = self.max_items;

        // Quadrant order follows `(x < cx ? 0 : 2) + (y < cy ? 0 : 1)`
        let mut children = Box::new([
            Self::new(
                BoundingBox::new_unchecked(env.min_x(), env.min_y(), cx, cy),
                max_items,
                depth,
            ),
            Self::new(
                BoundingBox::new_unchecked(env.min_x(), cy, cx, env.max_y()),
                max_items,
                depth,
            ),
            Self::new(
                BoundingBox::new_unchecked(cx, env.min_y(), env.max_x(), cy),
                max_items,
                depth,
            ),
            Self::new(
                BoundingBox::new_unchecked(cx, cy, env.max_x(), env.max_y()),
                max_items,
                depth,
            ),
        ]);

        for (item, bb) in std::mem::take(&mut self.items_small) {
            Self::add_to_children(&mut children, item, bb);
        }
        self.children = Some(children);

        trace!(depth = self.depth, "split quadtree node");
    }

    fn unsplit(&mut self) {
        self.children = None;
        self.items_small = IndexMap::new();
        trace!(depth = self.depth, "unsplit quadtree node");
    }

    pub(crate) fn remove(&mut self, item: &T, bb: &BoundingBox) {
        self.count -= 1;

        if self.items_large.shift_remove(item).is_some() {
            return;
        }

        match self.children.as_deref_mut() {
            None => {
                self.items_small.shift_remove(item);
            }
            Some(children) => {
                for child in children
                    .iter_mut()
                    .filter(|child| child.envelope.intersects(bb))
                {
                    child.remove(item, bb);
                }
                if children.iter().all(|child| child.count == 0) {
                    self.unsplit();
                }
            }
        }
    }

    /// Push every stored item whose box intersects `bb` onto `results`.
    ///
    /// Items stored in several children are pushed once per child.
    pub(crate) fn query<'a>(&'a self, bb: &BoundingBox, results: &mut Vec<&'a T>) {
        results.extend(
            self.items_large
                .iter()
                .filter(|(_, item_bb)| item_bb.intersects(bb))
                .map(|(item, _)| item),
        );

        match self.children.as_deref() {
            None => results.extend(
                self.items_small
                    .iter()
                    .filter(|(_, item_bb)| item_bb.intersects(bb))
                    .map(|(item, _)| item),
            ),
            Some(children) => {
                for child in children.iter().filter(|child| child.envelope.intersects(bb)) {
                    child.query(bb, results);
                }
            }
        }
    }
}
