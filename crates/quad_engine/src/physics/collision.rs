//! Narrow-phase circle tests and impulse response, driven by tree traversal
//!
//! The broad phase is the quadtree itself: a body is only tested against the
//! occupants of the nodes its traversal visits. The narrow phase is an exact
//! circle overlap test plus a closing-velocity check, and the response is a
//! single impulse along the contact normal. There is no positional
//! correction, so bodies may briefly interpenetrate.

use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyRegistry};
use crate::foundation::math::Vec2;
use crate::spatial::{NodeId, Quadtree};

/// Nodes a body is tested against when it resolves its collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolveScope {
    /// The body's own node and everything below it.
    ///
    /// A small body nested deep in the tree never sees a large body held by
    /// one of its ancestors from its own traversal; the pair is only found
    /// when the large body resolves.
    #[default]
    Descendants,

    /// The body's own subtree plus every ancestor up to the root
    DescendantsAndAncestors,
}

/// Unit vector from `b`'s center towards `a`'s, `None` when the centers coincide
pub fn contact_normal(a: &Body, b: &Body) -> Option<Vec2> {
    (a.position - b.position).try_normalize(f32::EPSILON)
}

/// Whether `a` and `b` overlap (touching counts) and are moving towards each other
///
/// Bodies with coincident centers have no contact normal and never collide.
pub fn is_colliding(a: &Body, b: &Body) -> bool {
    let Some(normal) = contact_normal(a, b) else {
        return false;
    };
    let distance = (a.position - b.position).magnitude();
    distance <= a.radius() + b.radius() && (a.velocity - b.velocity).dot(&normal) < 0.0
}

/// Apply the collision impulse to both bodies and return its magnitude `j`
///
/// `restitution` is the coefficient `e`; 1.0 is perfectly elastic.
pub fn apply_impulse(a: &mut Body, b: &mut Body, restitution: f32) -> f32 {
    let Some(normal) = contact_normal(a, b) else {
        return 0.0;
    };
    let relative = a.velocity - b.velocity;
    let impulse = -(1.0 + restitution) * relative.dot(&normal)
        / (normal.dot(&normal) * (a.inverse_mass() + b.inverse_mass()));

    a.velocity += normal * (impulse * a.inverse_mass());
    b.velocity -= normal * (impulse * b.inverse_mass());
    impulse
}

/// Resolves one body's collisions against the tree contents
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    restitution: f32,
    scope: ResolveScope,
}

impl CollisionResolver {
    /// Create a resolver with restitution `e` and a traversal scope
    pub fn new(restitution: f32, scope: ResolveScope) -> Self {
        Self { restitution, scope }
    }

    /// Restitution coefficient
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Traversal scope
    pub fn scope(&self) -> ResolveScope {
        self.scope
    }

    /// Test `body` against every other occupant of its node and of all nodes
    /// below it, in quadrant order, applying an impulse to each colliding
    /// pair. With [`ResolveScope::DescendantsAndAncestors`] the ancestors'
    /// occupants are tested as well. Returns the number of impulses applied.
    pub fn resolve(&self, body: BodyId, bodies: &mut BodyRegistry, tree: &Quadtree) -> usize {
        let start = bodies[body].node();
        let mut impulses = 0;

        let mut pending: Vec<NodeId> = vec![start];
        while let Some(node_id) = pending.pop() {
            let node = tree.node(node_id);
            impulses += self.resolve_against(body, node.occupants(), bodies);
            if let Some(children) = node.children {
                pending.extend(children.into_iter().rev());
            }
        }

        if self.scope == ResolveScope::DescendantsAndAncestors {
            for ancestor in tree.ancestors(start) {
                impulses += self.resolve_against(body, tree.node(ancestor).occupants(), bodies);
            }
        }

        impulses
    }

    fn resolve_against(&self, body: BodyId, occupants: &[BodyId], bodies: &mut BodyRegistry) -> usize {
        let mut impulses = 0;
        for &other in occupants {
            if other == body {
                continue;
            }
            let (a, b) = bodies.pair_mut(body, other);
            if is_colliding(a, b) {
                let magnitude = apply_impulse(a, b, self.restitution);
                log::trace!("Impulse {magnitude:.3} between bodies {body} and {other}");
                impulses += 1;
            }
        }
        impulses
    }
}
