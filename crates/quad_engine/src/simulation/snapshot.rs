//! Read-only views handed to renderers and overlays

use crate::foundation::math::Vec2;
use crate::physics::BodyId;
use crate::spatial::NodeId;

/// One body as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    /// Handle of the body
    pub id: BodyId,
    /// Center
    pub position: Vec2,
    /// Velocity
    pub velocity: Vec2,
    /// Radius
    pub radius: f32,
    /// Node holding the body
    pub node: NodeId,
    /// Depth of that node
    pub depth: u32,
}

/// One populated tree node, for debug overlays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSnapshot {
    /// Node handle
    pub id: NodeId,
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
    /// Depth in the tree
    pub depth: u32,
    /// Bodies stored directly in the node
    pub occupants: usize,
}

/// Summary counters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationStats {
    /// Ticks run so far
    pub ticks: u64,
    /// Live bodies
    pub bodies: usize,
    /// Nodes holding at least one body
    pub occupied_nodes: usize,
    /// Deepest node holding a body, `None` with no bodies
    pub deepest_occupied_depth: Option<u32>,
    /// Sum of `0.5 * m * |v|^2` over all bodies
    pub kinetic_energy: f32,
}
