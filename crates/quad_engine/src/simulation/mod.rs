//! Fixed-timestep simulation stepper
//!
//! Ties the body registry, the quadtree and the collision resolver together.
//! Each frame's wall-clock delta feeds an accumulator; every whole fixed step
//! runs one tick. A tick visits the bodies in registry order and, for each
//! one, integrates its position, reflects it off the world walls, relocates
//! it in the tree and resolves its collisions.

mod snapshot;


pub use snapshot::{BodySnapshot, NodeSnapshot, SimulationStats};

use rand::Rng;
use thiserror::Error;

use crate::core::{ConfigError, SimulationConfig};
use crate::foundation::math::{Aabb2, Vec2};
use crate::foundation::time::FixedTimestep;
use crate::physics::{spawn_desc, Body, BodyDesc, BodyId, BodyRegistry, CollisionResolver, SpawnCommand};
use crate::spatial::{NodeId, Quadtree, QuadtreeError};

/// Errors surfaced to the embedding program
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Configuration failed validation
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Tree could not be built
    #[error("Quadtree error: {0}")]
    Quadtree(#[from] QuadtreeError),

    /// Body description with unusable values
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// Body whose bounding square cannot fit inside the world
    #[error("Body radius {radius} does not fit inside a {width}x{height} world")]
    BodyTooLarge {
        /// Requested radius
        radius: f32,
        /// World width
        width: f32,
        /// World height
        height: f32,
    },
}

/// Center coordinate on one axis that keeps a circle of `radius` inside
/// `[min, max]`
///
/// `(max - radius) + radius` can round one ULP past `max`, so the result is
/// nudged inward until the edges land inside in f32 arithmetic.
fn fit_axis(center: f32, radius: f32, min: f32, max: f32) -> f32 {
    let mut center = center.max(min + radius).min(max - radius);
    while center + radius > max {
        center -= ulp(center, radius);
    }
    while center - radius < min {
        center += ulp(center, radius);
    }
    center
}

/// Roughly one unit in the last place of the larger operand
fn ulp(center: f32, radius: f32) -> f32 {
    (center.abs().max(radius) * f32::EPSILON).max(f32::MIN_POSITIVE)
}

/// Reflect a body off the walls of `world`
///
/// On each axis, a body whose edge has crossed a wall is clamped back so it
/// lies fully inside and that velocity component is negated. Touching a wall
/// exactly is not a crossing.
pub fn reflect_off_walls(body: &mut Body, world: &Aabb2) {
    let radius = body.radius();
    for axis in 0..2 {
        let (min, max) = (world.min[axis], world.max[axis]);
        let position = body.position[axis];
        if position - radius < min || position + radius > max {
            body.position[axis] = fit_axis(position, radius, min, max);
            body.velocity[axis] = -body.velocity[axis];
        }
    }
}

/// The simulation core: bodies, tree, resolver and timestep accumulator
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    world: Aabb2,
    tree: Quadtree,
    bodies: BodyRegistry,
    resolver: CollisionResolver,
    timestep: FixedTimestep,
    ticks: u64,
}

impl Simulation {
    /// Validate the configuration and build the full tree
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let world = Aabb2::new(Vec2::zeros(), Vec2::new(config.world.width, config.world.height));
        let tree = Quadtree::covering(&world, config.tree.max_depth)?;
        let resolver = CollisionResolver::new(config.physics.restitution, config.physics.resolve_scope);
        let timestep = FixedTimestep::new(config.physics.fixed_timestep);

        log::info!(
            "Simulation ready: {}x{} world, step {:.4}s, restitution {}, scope {:?}",
            config.world.width,
            config.world.height,
            config.physics.fixed_timestep,
            config.physics.restitution,
            config.physics.resolve_scope
        );

        Ok(Self {
            config,
            world,
            tree,
            bodies: BodyRegistry::new(),
            resolver,
            timestep,
            ticks: 0,
        })
    }

    /// Configuration the simulation was built from
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// World rectangle, origin at the upper-left corner
    pub fn world(&self) -> &Aabb2 {
        &self.world
    }

    /// Spatial tree
    pub fn tree(&self) -> &Quadtree {
        &self.tree
    }

    /// All bodies
    pub fn bodies(&self) -> &BodyRegistry {
        &self.bodies
    }

    /// Single body by handle
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Collision resolver in use
    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    /// Ticks run since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Time accumulated but not yet simulated
    pub fn pending_time(&self) -> f32 {
        self.timestep.accumulated()
    }

    /// Add a body and insert it into the tree
    ///
    /// The position is clamped into the world first, so the body always
    /// starts fully inside it. Bodies wider than the world are rejected.
    pub fn add_body(&mut self, desc: BodyDesc) -> Result<BodyId, SimulationError> {
        let desc = self.admit(desc)?;
        Ok(self.insert_body(&desc))
    }

    /// Check a description and clamp its position into the world
    fn admit(&self, desc: BodyDesc) -> Result<BodyDesc, SimulationError> {
        if !desc.radius.is_finite() || desc.radius <= 0.0 {
            return Err(SimulationError::InvalidBody(format!("radius must be positive, got {}", desc.radius)));
        }
        if !desc.mass.is_finite() || desc.mass <= 0.0 {
            return Err(SimulationError::InvalidBody(format!("mass must be positive, got {}", desc.mass)));
        }
        if !(desc.position.iter().all(|v| v.is_finite()) && desc.velocity.iter().all(|v| v.is_finite())) {
            return Err(SimulationError::InvalidBody("position and velocity must be finite".to_string()));
        }

        let size = self.world.size();
        if 2.0 * desc.radius > size.x.min(size.y) {
            return Err(SimulationError::BodyTooLarge {
                radius: desc.radius,
                width: size.x,
                height: size.y,
            });
        }

        let mut desc = desc;
        for axis in 0..2 {
            desc.position[axis] =
                fit_axis(desc.position[axis], desc.radius, self.world.min[axis], self.world.max[axis]);
        }
        Ok(desc)
    }

    fn insert_body(&mut self, desc: &BodyDesc) -> BodyId {
        let id = self.bodies.next_id();
        let node = self.tree.insert(id, &Aabb2::from_circle(desc.position, desc.radius), NodeId::ROOT);
        self.bodies.push(Body::new(desc, node))
    }

    /// Spawn bodies at the world center using the caller's random source
    ///
    /// Every body of the command is checked before any is inserted, so a
    /// failed command leaves the simulation unchanged.
    pub fn spawn<R: Rng + ?Sized>(&mut self, command: SpawnCommand, rng: &mut R) -> Result<Vec<BodyId>, SimulationError> {
        let origin = self.world.center();
        let descs = (0..command.count)
            .map(|_| self.admit(spawn_desc(&self.config.spawn, origin, command.large, &mut *rng)))
            .collect::<Result<Vec<_>, _>>()?;
        let spawned: Vec<BodyId> = descs.iter().map(|desc| self.insert_body(desc)).collect();

        log::debug!(
            "Spawned {} {} bodies ({} total)",
            spawned.len(),
            if command.large { "large" } else { "small" },
            self.bodies.len()
        );
        Ok(spawned)
    }

    /// Feed one frame's wall-clock delta and run every whole tick it covers
    ///
    /// Returns the number of ticks run. Negative or non-finite deltas are
    /// ignored.
    pub fn advance(&mut self, frame_delta: f32) -> u32 {
        if !self.timestep.accumulate(frame_delta) {
            log::warn!("Ignoring invalid frame delta {frame_delta}");
            return 0;
        }

        let mut ticks = 0;
        while self.timestep.consume_step() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Run exactly one fixed step
    pub fn tick(&mut self) {
        let dt = self.timestep.step();
        for id in self.bodies.ids().collect::<Vec<_>>() {
            self.step_body(id, dt);
        }
        self.ticks += 1;
    }

    fn step_body(&mut self, id: BodyId, dt: f32) {
        let body = &mut self.bodies[id];
        body.position += body.velocity * dt;
        reflect_off_walls(body, &self.world);

        let node = self.tree.relocate(id, &body.aabb(), body.node());
        body.set_node(node);

        self.resolver.resolve(id, &mut self.bodies, &self.tree);
    }

    /// Position and shape of every body, for rendering
    pub fn body_snapshots(&self) -> impl Iterator<Item = BodySnapshot> + '_ {
        self.bodies.iter().map(|(id, body)| BodySnapshot {
            id,
            position: body.position,
            velocity: body.velocity,
            radius: body.radius(),
            node: body.node(),
            depth: self.tree.node(body.node()).depth,
        })
    }

    /// Bounds and occupant count of every node holding a body, for debug overlays
    pub fn node_snapshots(&self) -> impl Iterator<Item = NodeSnapshot> + '_ {
        self.tree.occupied_nodes().map(|(id, node)| NodeSnapshot {
            id,
            min: node.min(),
            max: node.max(),
            depth: node.depth,
            occupants: node.occupants().len(),
        })
    }

    /// Summary counters for logging and overlays
    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            ticks: self.ticks,
            bodies: self.bodies.len(),
            occupied_nodes: self.tree.occupied_nodes().count(),
            deepest_occupied_depth: self.tree.occupied_nodes().map(|(_, node)| node.depth).max(),
            kinetic_energy: self.bodies.iter().map(|(_, body)| body.kinetic_energy()).sum(),
        }
    }
}
