//! # Simulation Configuration
//!
//! Every tunable of the simulation core in one serializable tree. Each
//! section carries `#[serde(default)]`, so a TOML or RON file only needs to
//! name the values it changes.
//!
//! ```toml
//! [world]
//! width = 1920.0
//! height = 1080.0
//!
//! [tree]
//! max_depth = 6
//! ```

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};
use crate::physics::ResolveScope;
use crate::spatial::MAX_TREE_DEPTH;

/// Extent of the simulated plane. The origin is the upper-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width in world units
    pub width: f32,
    /// Height in world units
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Spatial tree shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Depth of the leaves; the root is depth 0
    pub max_depth: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { max_depth: 5 }
    }
}

/// Integration and collision response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Length of one tick in seconds
    pub fixed_timestep: f32,
    /// Restitution coefficient `e` used by the impulse response
    pub restitution: f32,
    /// Which nodes a body is tested against
    pub resolve_scope: ResolveScope,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            restitution: 1.0,
            resolve_scope: ResolveScope::Descendants,
        }
    }
}

/// Parameters for bodies created by spawn commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Smallest radius drawn for small bodies (whole units)
    pub small_radius_min: u32,
    /// Largest radius drawn for small bodies (whole units, inclusive)
    pub small_radius_max: u32,
    /// Mass of small bodies
    pub small_mass: f32,
    /// Radius of large bodies
    pub large_radius: f32,
    /// Mass of large bodies
    pub large_mass: f32,
    /// Per-axis velocity is drawn from `[-launch_speed, launch_speed]`
    pub launch_speed: f32,
    /// Seed for the embedder's spawn generator; `None` means entropy
    pub seed: Option<u64>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            small_radius_min: 5,
            small_radius_max: 10,
            small_mass: 1.0,
            large_radius: 25.0,
            large_mass: 10.0,
            launch_speed: 500.0,
            seed: None,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// World extent
    pub world: WorldConfig,
    /// Spatial tree shape
    pub tree: TreeConfig,
    /// Integration and collision response
    pub physics: PhysicsConfig,
    /// Spawned body parameters
    pub spawn: SpawnConfig,
}

impl Config for SimulationConfig {}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a positive finite number, got {value}"),
        })
    }
}

impl SimulationConfig {
    /// Check every value before a simulation is built from it
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;

        if self.tree.max_depth == 0 || self.tree.max_depth > MAX_TREE_DEPTH {
            return Err(ConfigError::Invalid {
                field: "tree.max_depth",
                reason: format!("must be within 1..={MAX_TREE_DEPTH}, got {}", self.tree.max_depth),
            });
        }

        positive("physics.fixed_timestep", self.physics.fixed_timestep)?;
        if !(0.0..=1.0).contains(&self.physics.restitution) {
            return Err(ConfigError::Invalid {
                field: "physics.restitution",
                reason: format!("must be within 0..=1, got {}", self.physics.restitution),
            });
        }

        let spawn = &self.spawn;
        if spawn.small_radius_min == 0 || spawn.small_radius_min > spawn.small_radius_max {
            return Err(ConfigError::Invalid {
                field: "spawn.small_radius_min",
                reason: format!(
                    "radius range {}..={} is empty or starts at zero",
                    spawn.small_radius_min, spawn.small_radius_max
                ),
            });
        }
        positive("spawn.small_mass", spawn.small_mass)?;
        positive("spawn.large_radius", spawn.large_radius)?;
        positive("spawn.large_mass", spawn.large_mass)?;

        let narrowest = self.world.width.min(self.world.height);
        for (field, radius) in [
            ("spawn.small_radius_max", spawn.small_radius_max as f32),
            ("spawn.large_radius", spawn.large_radius),
        ] {
            if 2.0 * radius > narrowest {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("radius {radius} does not fit a {}x{} world", self.world.width, self.world.height),
                });
            }
        }
        if !spawn.launch_speed.is_finite() || spawn.launch_speed < 0.0 {
            return Err(ConfigError::Invalid {
                field: "spawn.launch_speed",
                reason: format!("expected a non-negative finite number, got {}", spawn.launch_speed),
            });
        }

        Ok(())
    }
}
