//! Spawn commands and the bodies they produce
//!
//! The random source is always passed in by the caller, so a seeded
//! generator gives a reproducible run.

use rand::Rng;

use super::body::BodyDesc;
use crate::core::SpawnConfig;
use crate::foundation::math::Vec2;

/// Request from the embedding program to add bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnCommand {
    /// How many bodies to create
    pub count: u32,
    /// Large variant (fixed radius and mass) instead of small ones
    pub large: bool,
}

impl SpawnCommand {
    /// `count` small bodies
    pub fn small(count: u32) -> Self {
        Self { count, large: false }
    }

    /// `count` large bodies
    pub fn large(count: u32) -> Self {
        Self { count, large: true }
    }
}

/// Describe one spawned body starting at `origin`
///
/// Small bodies draw a whole-unit radius from the configured range; large
/// ones use the fixed large radius and mass. Each velocity axis is drawn
/// independently from `[-launch_speed, launch_speed]`.
pub fn spawn_desc<R: Rng + ?Sized>(config: &SpawnConfig, origin: Vec2, large: bool, rng: &mut R) -> BodyDesc {
    let (radius, mass) = if large {
        (config.large_radius, config.large_mass)
    } else {
        let radius = rng.gen_range(config.small_radius_min..=config.small_radius_max);
        (radius as f32, config.small_mass)
    };

    let velocity = Vec2::new(
        config.launch_speed * rng.gen_range(-1.0f32..=1.0),
        config.launch_speed * rng.gen_range(-1.0f32..=1.0),
    );

    BodyDesc::new(origin, radius, mass).with_velocity(velocity)
}
