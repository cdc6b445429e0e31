//! Spawn cadence for the demo's simulated key presses

use quad_engine::prelude::SpawnCommand;

/// Small bodies created by an ordinary press
pub const SMALL_BATCH: u32 = 25;

/// Ordinary presses before a large body is spawned
pub const PRESSES_PER_LARGE: u32 = 10;

/// Turns spawn presses into commands: ten presses of small batches, then
/// one press that spawns a single large body, then the cycle restarts.
#[derive(Debug, Default)]
pub struct SpawnCycle {
    presses: u32,
}

impl SpawnCycle {
    /// Start a fresh cycle
    pub fn new() -> Self {
        Self::default()
    }

    /// Command for the next press
    pub fn press(&mut self) -> SpawnCommand {
        if self.presses == PRESSES_PER_LARGE {
            self.presses = 0;
            SpawnCommand::large(1)
        } else {
            self.presses += 1;
            SpawnCommand::small(SMALL_BATCH)
        }
    }
}
