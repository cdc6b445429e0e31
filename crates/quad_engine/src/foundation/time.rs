//! Time management utilities

use std::time::{Duration, Instant};

/// Fixed-step accumulator that decouples simulation ticks from frame rate
///
/// Each frame adds its wall-clock delta; the caller then drains whole steps
/// with [`FixedTimestep::consume_step`]. Any remainder smaller than one step
/// carries over to the next frame.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
}

impl FixedTimestep {
    /// Create an accumulator for the given step length in seconds
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
        }
    }

    /// Length of one step in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Time waiting to be simulated
    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// Add a frame delta. Returns `false` (and adds nothing) for negative or
    /// non-finite deltas.
    pub fn accumulate(&mut self, delta: f32) -> bool {
        if !delta.is_finite() || delta < 0.0 {
            return false;
        }
        self.accumulator += delta;
        true
    }

    /// Take one step out of the accumulator if a whole step is available
    pub fn consume_step(&mut self) -> bool {
        if self.accumulator >= self.step {
            self.accumulator -= self.step;
            true
        } else {
            false
        }
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Get the elapsed time, including a running interval
    pub fn elapsed(&self) -> Duration {
        self.elapsed + self.start_time.map_or(Duration::ZERO, |start| start.elapsed())
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }
}
