//! Fixed-depth quadtree spatial partitioning structure
//!
//! The whole tree, down to the configured maximum depth, is built once from
//! the world bounds. Topology never changes afterwards; only the occupant
//! lists do. A body is stored in the deepest node whose square fully
//! contains the body's bounding square, so bodies straddling a split line
//! stay in the shallowest node that still holds them.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]. The root is always
//! index 0 and children are laid out breadth-first.

use std::collections::VecDeque;
use std::fmt;

use crate::foundation::math::{Aabb2, Vec2};
use crate::physics::BodyId;

/// Deepest tree the builder accepts. Depth 10 already means ~1.4M nodes.
pub const MAX_TREE_DEPTH: u32 = 10;

/// Errors raised while building a tree
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QuadtreeError {
    /// Root half-width is zero, negative, or not finite
    #[error("Quadtree root half-width must be positive and finite, got {0}")]
    InvalidExtent(f32),

    /// Root center is not finite
    #[error("Quadtree root center must be finite, got ({x}, {y})")]
    InvalidCenter {
        /// Center x
        x: f32,
        /// Center y
        y: f32,
    },

    /// Depth outside `1..=MAX_TREE_DEPTH`
    #[error("Quadtree depth must be within 1..={}, got {}", MAX_TREE_DEPTH, .0)]
    InvalidDepth(u32),
}

/// Stable index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node
    pub const ROOT: Self = Self(0);

    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Child slot order. A body on a split line goes to the first quadrant in
/// this order that contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// Smaller x, smaller y
    UpperLeft = 0,
    /// Larger x, smaller y
    UpperRight = 1,
    /// Smaller x, larger y
    LowerLeft = 2,
    /// Larger x, larger y
    LowerRight = 3,
}

impl Quadrant {
    /// All quadrants in insertion-test order
    pub const ALL: [Self; 4] = [Self::UpperLeft, Self::UpperRight, Self::LowerLeft, Self::LowerRight];

    /// Offset direction of the quadrant's center from its parent's center
    fn offset_sign(self) -> Vec2 {
        match self {
            Self::UpperLeft => Vec2::new(-1.0, -1.0),
            Self::UpperRight => Vec2::new(1.0, -1.0),
            Self::LowerLeft => Vec2::new(-1.0, 1.0),
            Self::LowerRight => Vec2::new(1.0, 1.0),
        }
    }
}

/// Single square region of the tree
#[derive(Debug, Clone)]
pub struct QuadNode {
    /// Center of the square
    pub center: Vec2,

    /// Half of the side length
    pub half_width: f32,

    /// Depth in the tree (0 = root)
    pub depth: u32,

    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,

    /// Children in [`Quadrant::ALL`] order, `None` for leaves
    pub children: Option<[NodeId; 4]>,

    /// Bodies held here that fit in no single child
    occupants: Vec<BodyId>,
}

impl QuadNode {
    fn new(center: Vec2, half_width: f32, depth: u32, parent: Option<NodeId>) -> Self {
        Self {
            center,
            half_width,
            depth,
            parent,
            children: None,
            occupants: Vec::new(),
        }
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        self.center - Vec2::new(self.half_width, self.half_width)
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        self.center + Vec2::new(self.half_width, self.half_width)
    }

    /// Square covered by this node
    pub fn bounds(&self) -> Aabb2 {
        Aabb2::from_center_half_width(self.center, self.half_width)
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Whether the node's square fully contains `aabb`, edges included
    pub fn contains(&self, aabb: &Aabb2) -> bool {
        self.bounds().contains_aabb(aabb)
    }

    /// Bodies stored directly in this node
    pub fn occupants(&self) -> &[BodyId] {
        &self.occupants
    }
}

/// Fixed-depth quadtree over the world bounds
#[derive(Debug, Clone)]
pub struct Quadtree {
    nodes: Vec<QuadNode>,
    max_depth: u32,
}

impl Quadtree {
    /// Build every node down to `max_depth` under a square root
    pub fn new(center: Vec2, half_width: f32, max_depth: u32) -> Result<Self, QuadtreeError> {
        if !half_width.is_finite() || half_width <= 0.0 {
            return Err(QuadtreeError::InvalidExtent(half_width));
        }
        if !center.x.is_finite() || !center.y.is_finite() {
            return Err(QuadtreeError::InvalidCenter { x: center.x, y: center.y });
        }
        if max_depth == 0 || max_depth > MAX_TREE_DEPTH {
            return Err(QuadtreeError::InvalidDepth(max_depth));
        }

        // 4^0 + 4^1 + ... + 4^max_depth
        let node_count = ((1usize << (2 * (max_depth + 1))) - 1) / 3;
        let mut nodes = Vec::with_capacity(node_count);
        nodes.push(QuadNode::new(center, half_width, 0, None));

        let mut pending = VecDeque::from([NodeId::ROOT]);
        while let Some(parent_id) = pending.pop_front() {
            let (parent_center, parent_half, parent_depth) = {
                let parent = &nodes[parent_id.index()];
                (parent.center, parent.half_width, parent.depth)
            };
            if parent_depth == max_depth {
                continue;
            }

            let child_half = parent_half * 0.5;
            let mut children = [NodeId::ROOT; 4];
            for (slot, quadrant) in children.iter_mut().zip(Quadrant::ALL) {
                let child_center = parent_center + quadrant.offset_sign() * child_half;
                #[allow(clippy::cast_possible_truncation)]
                let id = NodeId(nodes.len() as u32);
                nodes.push(QuadNode::new(child_center, child_half, parent_depth + 1, Some(parent_id)));
                pending.push_back(id);
                *slot = id;
            }
            nodes[parent_id.index()].children = Some(children);
        }

        debug_assert_eq!(nodes.len(), node_count);
        log::info!(
            "Built quadtree: {} nodes, depth {}, root half-width {}",
            nodes.len(),
            max_depth,
            half_width
        );

        Ok(Self { nodes, max_depth })
    }

    /// Build the tree over a rectangular world
    ///
    /// The root is the square of side `max(width, height)` centered on the
    /// rectangle, so the whole world always lies inside it.
    pub fn covering(world: &Aabb2, max_depth: u32) -> Result<Self, QuadtreeError> {
        let half_extents = world.half_extents();
        Self::new(world.center(), half_extents.x.max(half_extents.y), max_depth)
    }

    /// Depth of the leaves
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least a root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root node
    pub fn root(&self) -> &QuadNode {
        &self.nodes[NodeId::ROOT.index()]
    }

    /// Node by id
    ///
    /// # Panics
    /// If `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id.index()]
    }

    /// All nodes with their ids, breadth-first
    #[allow(clippy::cast_possible_truncation)]
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &QuadNode)> {
        self.nodes.iter().enumerate().map(|(index, node)| (NodeId(index as u32), node))
    }

    /// Nodes holding at least one body
    pub fn occupied_nodes(&self) -> impl Iterator<Item = (NodeId, &QuadNode)> {
        self.nodes().filter(|(_, node)| !node.occupants.is_empty())
    }

    /// Total number of occupant entries across all nodes
    pub fn occupant_total(&self) -> usize {
        self.nodes.iter().map(|node| node.occupants.len()).sum()
    }

    /// Find the node whose occupant list holds `body`
    pub fn locate(&self, body: BodyId) -> Option<NodeId> {
        self.nodes().find(|(_, node)| node.occupants.contains(&body)).map(|(id, _)| id)
    }

    /// Ancestors of `id`, nearest first, ending with the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).parent,
        }
    }

    /// Descend from `start` and store `body` in the deepest node that fully
    /// contains `aabb`. Children are tested in [`Quadrant::ALL`] order and the
    /// first match wins. Returns the node now holding the body.
    ///
    /// The caller guarantees `start` contains `aabb` (or is the root).
    pub fn insert(&mut self, body: BodyId, aabb: &Aabb2, start: NodeId) -> NodeId {
        let target = self.descend(aabb, start);
        self.nodes[target.index()].occupants.push(body);
        log::trace!("Inserted body {} into {} at depth {}", body, target, self.node(target).depth);
        target
    }

    /// Move `body` to the right node after its position changed
    ///
    /// If `current` still contains the body it may only move deeper. Otherwise
    /// the body walks up through the ancestors until one contains it (the
    /// root in the worst case) and descends again from there. Calling this
    /// twice without moving the body leaves it where it is.
    ///
    /// # Panics
    /// If `body` is not in `current`'s occupant list.
    pub fn relocate(&mut self, body: BodyId, aabb: &Aabb2, current: NodeId) -> NodeId {
        let mut anchor = current;
        while !self.node(anchor).contains(aabb) {
            match self.node(anchor).parent {
                Some(parent) => anchor = parent,
                None => {
                    // Upstream clamping keeps bodies inside the world, which
                    // lies inside the root. Hold the body at the root anyway.
                    log::warn!("Body {} extends past the quadtree root; holding it at the root", body);
                    break;
                }
            }
        }

        let target = self.descend(aabb, anchor);
        if target == current {
            return current;
        }

        self.remove(body, current);
        self.nodes[target.index()].occupants.push(body);
        log::trace!("Relocated body {} from {} to {}", body, current, target);
        target
    }

    /// Deepest node under `start` (inclusive) that fully contains `aabb`
    fn descend(&self, aabb: &Aabb2, start: NodeId) -> NodeId {
        let mut current = start;
        while let Some(children) = self.node(current).children {
            match children.into_iter().find(|&child| self.node(child).contains(aabb)) {
                Some(child) => current = child,
                None => break,
            }
        }
        current
    }

    /// Remove `body` from the occupant list of `node` by identity scan
    fn remove(&mut self, body: BodyId, node: NodeId) {
        let occupants = &mut self.nodes[node.index()].occupants;
        let Some(index) = occupants.iter().position(|&occupant| occupant == body) else {
            panic!("body {body} is not an occupant of {node}");
        };
        occupants.swap_remove(index);
    }
}

/// Iterator over a node's ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a Quadtree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).parent;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(index: u32) -> BodyId {
        BodyId::from_index(index)
    }

    fn square_tree(max_depth: u32) -> Quadtree {
        // Root covers [0, 1024] on both axes; leaves at depth 4 are 64 wide.
        Quadtree::new(Vec2::new(512.0, 512.0), 512.0, max_depth).unwrap()
    }

    #[test]
    fn test_build_materializes_all_levels() {
        let tree = square_tree(3);
        assert_eq!(tree.len(), 1 + 4 + 16 + 64);
        assert_eq!(tree.root().depth, 0);
        assert!(tree.root().parent.is_none());

        for (id, node) in tree.nodes() {
            assert_eq!(node.is_leaf(), node.depth == 3, "{id} at depth {}", node.depth);
        }
    }

    #[test]
    fn test_children_tile_parent_exactly() {
        let tree = Quadtree::new(Vec2::new(640.0, 360.0), 640.0, 4).unwrap();

        for (id, node) in tree.nodes() {
            let Some(children) = node.children else { continue };
            let [ul, ur, ll, lr] = children.map(|child| tree.node(child));

            for child in [ul, ur, ll, lr] {
                assert_eq!(child.half_width, node.half_width * 0.5);
                assert_eq!(child.depth, node.depth + 1);
                assert_eq!(child.parent, Some(id));
            }

            // Outer corners match the parent.
            assert_eq!(ul.min(), node.min());
            assert_eq!(lr.max(), node.max());
            assert_eq!(Vec2::new(ur.max().x, ur.min().y), Vec2::new(node.max().x, node.min().y));
            assert_eq!(Vec2::new(ll.min().x, ll.max().y), Vec2::new(node.min().x, node.max().y));

            // Inner edges meet on the split lines with no gap or overlap.
            assert_eq!(ul.max(), node.center);
            assert_eq!(lr.min(), node.center);
            assert_eq!(ur.min().x, ul.max().x);
            assert_eq!(ll.min().y, ul.max().y);
            assert_eq!(ur.max().y, lr.min().y);
            assert_eq!(ll.max().x, lr.min().x);
        }
    }

    #[test]
    fn test_quadrant_order() {
        let tree = square_tree(1);
        let children = tree.root().children.unwrap();
        assert_eq!(tree.node(children[Quadrant::UpperLeft as usize]).center, Vec2::new(256.0, 256.0));
        assert_eq!(tree.node(children[Quadrant::UpperRight as usize]).center, Vec2::new(768.0, 256.0));
        assert_eq!(tree.node(children[Quadrant::LowerLeft as usize]).center, Vec2::new(256.0, 768.0));
        assert_eq!(tree.node(children[Quadrant::LowerRight as usize]).center, Vec2::new(768.0, 768.0));
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        assert_eq!(
            Quadtree::new(Vec2::new(0.0, 0.0), 0.0, 3).unwrap_err(),
            QuadtreeError::InvalidExtent(0.0)
        );
        assert!(Quadtree::new(Vec2::new(0.0, 0.0), -5.0, 3).is_err());
        assert!(Quadtree::new(Vec2::new(f32::NAN, 0.0), 5.0, 3).is_err());
        assert_eq!(
            Quadtree::new(Vec2::new(0.0, 0.0), 5.0, 0).unwrap_err(),
            QuadtreeError::InvalidDepth(0)
        );
        assert!(Quadtree::new(Vec2::new(0.0, 0.0), 5.0, MAX_TREE_DEPTH + 1).is_err());
    }

    #[test]
    fn test_covering_uses_longest_side() {
        let world = Aabb2::new(Vec2::new(0.0, 0.0), Vec2::new(1280.0, 720.0));
        let tree = Quadtree::covering(&world, 2).unwrap();
        assert_eq!(tree.root().min(), Vec2::new(0.0, -280.0));
        assert_eq!(tree.root().max(), Vec2::new(1280.0, 1000.0));
        assert!(tree.root().contains(&world));
    }

    #[test]
    fn test_small_body_reaches_leaf() {
        let mut tree = square_tree(4);
        // Center of the leaf spanning [64, 128] x [64, 128].
        let aabb = Aabb2::from_circle(Vec2::new(96.0, 96.0), 1.0);
        let node = tree.insert(body(0), &aabb, NodeId::ROOT);

        assert_eq!(tree.node(node).depth, 4);
        assert!(tree.node(node).contains(&aabb));
        assert_eq!(tree.node(node).occupants(), &[body(0)]);
    }

    #[test]
    fn test_straddling_body_stays_shallow() {
        let mut tree = square_tree(4);

        // Crosses the root's vertical split line.
        let root_split = Aabb2::from_circle(Vec2::new(512.0, 100.0), 4.0);
        assert_eq!(tree.insert(body(0), &root_split, NodeId::ROOT), NodeId::ROOT);

        // Crosses the depth-1 split at x = 256 but not the root split.
        let depth_one_split = Aabb2::from_circle(Vec2::new(256.0, 100.0), 4.0);
        let node = tree.insert(body(1), &depth_one_split, NodeId::ROOT);
        assert_eq!(tree.node(node).depth, 1);
        assert_eq!(node, tree.root().children.unwrap()[Quadrant::UpperLeft as usize]);
    }

    #[test]
    fn test_split_line_tie_break_prefers_first_quadrant() {
        let mut tree = square_tree(1);
        // A zero-size box on the center point fits every quadrant inclusively.
        let point = Aabb2::from_circle(Vec2::new(512.0, 512.0), 0.0);
        let node = tree.insert(body(0), &point, NodeId::ROOT);
        assert_eq!(node, tree.root().children.unwrap()[Quadrant::UpperLeft as usize]);
    }

    #[test]
    fn test_relocate_moves_deeper_when_it_fits() {
        let mut tree = square_tree(4);
        let straddling = Aabb2::from_circle(Vec2::new(512.0, 512.0), 4.0);
        let node = tree.insert(body(0), &straddling, NodeId::ROOT);
        assert_eq!(node, NodeId::ROOT);

        let moved = Aabb2::from_circle(Vec2::new(96.0, 96.0), 4.0);
        let node = tree.relocate(body(0), &moved, node);
        assert_eq!(tree.node(node).depth, 4);
        assert!(tree.root().occupants().is_empty());
        assert_eq!(tree.occupant_total(), 1);
    }

    #[test]
    fn test_relocate_walks_up_then_down() {
        let mut tree = square_tree(4);
        let start = Aabb2::from_circle(Vec2::new(96.0, 96.0), 4.0);
        let leaf = tree.insert(body(0), &start, NodeId::ROOT);

        // Into the opposite corner of the world.
        let moved = Aabb2::from_circle(Vec2::new(928.0, 928.0), 4.0);
        let node = tree.relocate(body(0), &moved, leaf);

        assert_ne!(node, leaf);
        assert_eq!(tree.node(node).depth, 4);
        assert!(tree.node(node).contains(&moved));
        assert!(tree.node(leaf).occupants().is_empty());
        assert_eq!(tree.locate(body(0)), Some(node));
    }

    #[test]
    fn test_relocate_is_idempotent() {
        let mut tree = square_tree(4);
        let aabb = Aabb2::from_circle(Vec2::new(300.0, 700.0), 6.0);
        let first = tree.insert(body(7), &aabb, NodeId::ROOT);

        let second = tree.relocate(body(7), &aabb, first);
        let third = tree.relocate(body(7), &aabb, second);
        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(tree.node(third).occupants(), &[body(7)]);
    }

    #[test]
    fn test_relocate_outside_root_holds_at_root() {
        let mut tree = square_tree(2);
        let aabb = Aabb2::from_circle(Vec2::new(96.0, 96.0), 4.0);
        let node = tree.insert(body(0), &aabb, NodeId::ROOT);

        let escaped = Aabb2::from_circle(Vec2::new(-50.0, 96.0), 4.0);
        assert_eq!(tree.relocate(body(0), &escaped, node), NodeId::ROOT);
        assert_eq!(tree.root().occupants(), &[body(0)]);
    }

    #[test]
    fn test_ancestors_end_at_root() {
        let mut tree = square_tree(3);
        let leaf = tree.insert(body(0), &Aabb2::from_circle(Vec2::new(60.0, 60.0), 1.0), NodeId::ROOT);
        let chain: Vec<_> = tree.ancestors(leaf).collect();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.last(), Some(&NodeId::ROOT));
        assert_eq!(tree.ancestors(NodeId::ROOT).count(), 0);
    }
}
