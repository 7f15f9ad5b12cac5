use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdQuadError {
    /// An argument did not satisfy the operation's preconditions, e.g. a point whose length does
    /// not match the tree's dimensionality or a box whose minimum exceeds its maximum.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A k-d tree insert collided with an existing point while the tree uses
    /// [`DuplicateBehavior::Error`][crate::kdtree::DuplicateBehavior::Error].
    #[error("Cannot add node whose coordinates are already stored within the KdTree")]
    DuplicateNode,

    /// An item was added to a quadtree that already tracks it.
    #[error("Item is already stored within the QuadTree")]
    DuplicateItem,

    /// Peek or pop on an empty priority queue or neighbour list.
    #[error("Collection is empty")]
    EmptyCollection,
}

/// Result type for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, KdQuadError>;
