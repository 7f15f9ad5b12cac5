//! A mutable region quadtree over bounding boxes.

#![warn(missing_docs)]

mod node;
mod tree;

pub use tree::QuadTree;

#[cfg(test)]
mod test;
