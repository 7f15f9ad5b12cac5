//! A mutable, pointer-based K-D tree with nearest neighbour and radial searches.

#![warn(missing_docs)]

mod hyper_rect;
mod neighbours;
mod node;
mod priority_queue;
mod traversal;
mod tree;

pub use neighbours::NearestNeighbourList;
pub use node::KdTreeNode;
pub use priority_queue::PriorityQueue;
pub use traversal::Iter;
pub use tree::{DuplicateBehavior, KdTree};
