use std::cmp::Ordering;
use std::fmt;

/// A single point/value pair stored in a [`KdTree`](crate::kdtree::KdTree).
#[derive(Debug, Clone)]
pub struct KdTreeNode<K, V> {
    pub(crate) point: Vec<K>,
    pub(crate) value: V,
    pub(crate) left: Option<Box<KdTreeNode<K, V>>>,
    pub(crate) right: Option<Box<KdTreeNode<K, V>>>,
}

impl<K, V> KdTreeNode<K, V> {
    pub(crate) fn new(point: Vec<K>, value: V) -> Self {
        Self {
            point,
            value,
            left: None,
            right: None,
        }
    }

    /// The coordinates of this node.
    pub fn point(&self) -> &[K] {
        &self.point
    }

    /// The value stored at this node.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// The child on the side selected by comparing a point against this node.
    ///
    /// `Less` and `Equal` select the left child, `Greater` the right.
    pub(crate) fn child(&self, ordering: Ordering) -> Option<&KdTreeNode<K, V>> {
        match ordering {
            Ordering::Greater => self.right.as_deref(),
            _ => self.left.as_deref(),
        }
    }

    pub(crate) fn child_mut(&mut self, ordering: Ordering) -> &mut Option<Box<KdTreeNode<K, V>>> {
        match ordering {
            Ordering::Greater => &mut self.right,
            _ => &mut self.left,
        }
    }

    /// Detach both children, leaving this node a leaf.
    pub(crate) fn take_children(
        &mut self,
    ) -> (Option<Box<KdTreeNode<K, V>>>, Option<Box<KdTreeNode<K, V>>>) {
        (self.left.take(), self.right.take())
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for KdTreeNode<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for coordinate in &self.point {
            write!(f, "{}\t", coordinate)?;
        }
        write!(f, "{}", self.value)
    }
}
