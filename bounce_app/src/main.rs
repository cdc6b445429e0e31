//! Headless bounce demo
//!
//! Drives the simulation core the way an interactive frame loop would:
//! jittered frame deltas, a spawn press every half second, and a summary
//! log line once per simulated second. Nothing is drawn.
//!
//! Usage: `bounce_headless [config.toml|config.ron] [frames]`

mod spawn_cycle;

use std::env;

use quad_engine::foundation::logging;
use quad_engine::foundation::time::Stopwatch;
use quad_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use spawn_cycle::SpawnCycle;

const DEFAULT_FRAMES: u32 = 1800;
const FRAMES_PER_PRESS: u32 = 30;
const FRAMES_PER_REPORT: u32 = 60;
const PRESS_LIMIT: u32 = 44;

#[derive(Error, Debug)]
enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] quad_engine::core::ConfigError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Invalid frame count '{0}'")]
    FrameCount(String),
}

struct BounceApp {
    simulation: Simulation,
    rng: StdRng,
    spawn_cycle: SpawnCycle,
    presses: u32,
}

impl BounceApp {
    fn new(config: SimulationConfig) -> Result<Self, AppError> {
        let rng = match config.spawn.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let simulation = Simulation::new(config)?;

        Ok(Self {
            simulation,
            rng,
            spawn_cycle: SpawnCycle::new(),
            presses: 0,
        })
    }

    fn frame(&mut self, frame: u32) -> Result<(), AppError> {
        if frame % FRAMES_PER_PRESS == 0 && self.presses < PRESS_LIMIT {
            let command = self.spawn_cycle.press();
            self.simulation.spawn(command, &mut self.rng)?;
            self.presses += 1;
        }

        // Wall-clock stand-in: 60 fps with some jitter.
        let delta = (1.0 / 60.0) * self.rng.gen_range(0.5f32..=1.5);
        self.simulation.advance(delta);

        if frame % FRAMES_PER_REPORT == 0 {
            self.report();
        }
        Ok(())
    }

    fn report(&self) {
        let stats = self.simulation.stats();
        log::info!(
            "tick {:>5} | bodies {:>4} | occupied nodes {:>4} | deepest {:?} | energy {:.0}",
            stats.ticks,
            stats.bodies,
            stats.occupied_nodes,
            stats.deepest_occupied_depth,
            stats.kinetic_energy
        );

        for node in self.simulation.node_snapshots().filter(|node| node.depth == 0) {
            log::debug!("root holds {} straddling bodies", node.occupants);
        }
    }

    fn run(mut self, frames: u32) -> Result<(), AppError> {
        let stopwatch = Stopwatch::start_new();
        for frame in 0..frames {
            self.frame(frame)?;
        }

        let stats = self.simulation.stats();
        log::info!(
            "Finished {} frames / {} ticks with {} bodies in {:.1} ms",
            frames,
            stats.ticks,
            stats.bodies,
            stopwatch.elapsed_millis()
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(log::LevelFilter::Info);

    let args: Vec<String> = env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => {
            log::info!("Loading config from {path}");
            SimulationConfig::load_from_file(path).map_err(AppError::from)?
        }
        None => SimulationConfig::default(),
    };
    let frames = match args.get(1) {
        Some(raw) => raw.parse().map_err(|_| AppError::FrameCount(raw.clone()))?,
        None => DEFAULT_FRAMES,
    };

    println!("=== Headless Bounce Demo ===");
    println!(
        "World {}x{}, tree depth {}, {} frames",
        config.world.width, config.world.height, config.tree.max_depth, frames
    );

    let app = BounceApp::new(config)?;
    app.run(frames)?;
    Ok(())
}
