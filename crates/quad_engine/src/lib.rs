//! # Quad Engine
//!
//! Simulation core for many circular bodies bouncing around a bounded 2D
//! plane, with a fixed-depth quadtree as the collision broad phase.
//!
//! ## Features
//!
//! - **Fixed-Depth Quadtree**: every node built up front in an index arena
//! - **Containment Placement**: bodies live in the deepest node that holds them
//! - **Elastic Impulses**: circle-circle narrow phase with configurable restitution
//! - **Fixed Timestep**: frame-rate independent stepping
//! - **Seedable Spawning**: reproducible runs from an injected random source
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quad_engine::prelude::*;
//! use rand::SeedableRng;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut simulation = Simulation::new(SimulationConfig::default())?;
//!     let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//!
//!     simulation.spawn(SpawnCommand::small(25), &mut rng)?;
//!     simulation.advance(1.0 / 60.0);
//!
//!     for body in simulation.body_snapshots() {
//!         println!("{} at {:?}", body.id, body.position);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod core;
pub mod config;
pub mod foundation;
pub mod spatial;
pub mod physics;
pub mod simulation;

pub use simulation::{Simulation, SimulationError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Simulation, SimulationError,
        core::config::{Config, SimulationConfig},
        foundation::math::{Aabb2, Vec2},
        physics::{BodyDesc, BodyId, ResolveScope, SpawnCommand},
        simulation::{BodySnapshot, NodeSnapshot, SimulationStats},
        spatial::{NodeId, Quadtree},
    };
}
