//! Iterative traversal of the nodes of a [`KdTree`](crate::kdtree::KdTree).

use tinyvec::TinyVec;

use crate::kdtree::KdTreeNode;

/// An iterator over the nodes of a k-d tree.
///
/// The root comes first. Every yielded node pushes its left child onto one stack and its right
/// child onto another, and the left stack is drained before the right one.
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    root: Option<&'a KdTreeNode<K, V>>,
    // Use TinyVec to avoid heap allocations for shallow trees
    left: TinyVec<[Option<&'a KdTreeNode<K, V>>; 32]>,
    right: TinyVec<[Option<&'a KdTreeNode<K, V>>; 32]>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: Option<&'a KdTreeNode<K, V>>) -> Self {
        Self {
            root,
            left: TinyVec::new(),
            right: TinyVec::new(),
        }
    }

    fn push_children(&mut self, node: &'a KdTreeNode<K, V>) {
        if let Some(left) = node.left.as_deref() {
            self.left.push(Some(left));
        }
        if let Some(right) = node.right.as_deref() {
            self.right.push(Some(right));
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a KdTreeNode<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = match self.root.take() {
            Some(root) => root,
            None => self.left.pop().or_else(|| self.right.pop()).flatten()?,
        };
        self.push_children(node);
        Some(node)
    }
}
