//! # Core Module
//!
//! Shared configuration for the simulation subsystems.

pub mod config;

pub use config::{
    SimulationConfig,
    WorldConfig,
    TreeConfig,
    PhysicsConfig,
    SpawnConfig,
    Config,
    ConfigError,
};
