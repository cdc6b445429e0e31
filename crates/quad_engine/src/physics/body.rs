//! Circular bodies and the registry that owns them

use std::fmt;

use crate::foundation::math::{Aabb2, Vec2};
use crate::spatial::NodeId;

/// Stable handle of a body in the [`BodyRegistry`]
///
/// Bodies are never removed during a run, so a handle stays valid for the
/// lifetime of the simulation that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u32);

impl BodyId {
    /// Handle for the body at `index` in registry order
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Position of the body in registry order
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Physical description of a body before it enters the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Initial center
    pub position: Vec2,
    /// Initial velocity in units per second
    pub velocity: Vec2,
    /// Circle radius
    pub radius: f32,
    /// Mass; the inverse is precomputed on creation
    pub mass: f32,
}

impl BodyDesc {
    /// Describe a body at rest
    pub fn new(position: Vec2, radius: f32, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec2::zeros(),
            radius,
            mass,
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Moving circle stored in the registry
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Center
    pub position: Vec2,
    /// Velocity in units per second
    pub velocity: Vec2,
    radius: f32,
    mass: f32,
    inverse_mass: f32,
    node: NodeId,
}

impl Body {
    /// A body only comes into existence together with its tree slot.
    pub(crate) fn new(desc: &BodyDesc, node: NodeId) -> Self {
        Self {
            position: desc.position,
            velocity: desc.velocity,
            radius: desc.radius,
            mass: desc.mass,
            inverse_mass: 1.0 / desc.mass,
            node,
        }
    }

    /// Circle radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Mass
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Precomputed `1 / mass`
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Tree node whose occupant list holds this body
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub(crate) fn set_node(&mut self, node: NodeId) {
        self.node = node;
    }

    /// Axis-aligned bounding square
    pub fn aabb(&self) -> Aabb2 {
        Aabb2::from_circle(self.position, self.radius)
    }

    /// `0.5 * m * |v|^2`
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }
}

/// Flat, append-only collection of bodies
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
}

impl BodyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether no body has been added yet
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Handle the next pushed body will receive
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn next_id(&self) -> BodyId {
        BodyId(self.bodies.len() as u32)
    }

    pub(crate) fn push(&mut self, body: Body) -> BodyId {
        let id = self.next_id();
        self.bodies.push(body);
        id
    }

    /// Body by handle
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    /// Mutable body by handle
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.index())
    }

    /// Two distinct bodies borrowed mutably at once
    ///
    /// # Panics
    /// If `a == b` or either handle is out of range.
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> (&mut Body, &mut Body) {
        assert_ne!(a, b, "pair_mut needs two distinct bodies");
        if a.index() < b.index() {
            let (head, tail) = self.bodies.split_at_mut(b.index());
            (&mut head[a.index()], &mut tail[0])
        } else {
            let (head, tail) = self.bodies.split_at_mut(a.index());
            (&mut tail[0], &mut head[b.index()])
        }
    }

    /// All handles in registry order
    #[allow(clippy::cast_possible_truncation)]
    pub fn ids(&self) -> impl Iterator<Item = BodyId> {
        (0..self.bodies.len() as u32).map(BodyId)
    }

    /// All bodies with their handles
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.ids().zip(self.bodies.iter())
    }
}

impl std::ops::Index<BodyId> for BodyRegistry {
    type Output = Body;

    fn index(&self, id: BodyId) -> &Body {
        &self.bodies[id.index()]
    }
}

impl std::ops::IndexMut<BodyId> for BodyRegistry {
    fn index_mut(&mut self, id: BodyId) -> &mut Body {
        &mut self.bodies[id.index()]
    }
}
