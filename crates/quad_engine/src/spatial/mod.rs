//! Spatial partitioning data structures
//!
//! Provides the fixed-depth quadtree that indexes bodies by containment
//! for broad-phase collision detection.

mod quadtree;

pub use quadtree::{Ancestors, NodeId, QuadNode, Quadrant, Quadtree, QuadtreeError, MAX_TREE_DEPTH};
