//! Headless frame loop with frame-rate reporting.
//!
//! An interactive embedding calls [`Runner::step_frame`] from its render
//! loop (drawing after each step); headless runs use [`Runner::run`] to
//! drive a fixed number of frames.

use std::time::Instant;

use kernel::{GpuSimulation, SimError};

/// Accumulates frames and reports the rate once per second.
///
/// Kept separate from the wall clock so the rollover logic is testable.
#[derive(Debug, Default)]
pub struct FrameRateCounter {
    frames: u32,
    last_report: f64,
}

impl FrameRateCounter {
    /// Record one frame at `elapsed` seconds since start. Returns the
    /// frames-per-second figure when a full second has rolled over.
    pub fn tick(&mut self, elapsed: f64) -> Option<u32> {
        self.frames += 1;
        if elapsed >= self.last_report + 1.0 {
            let rate = self.frames;
            self.frames = 0;
            self.last_report = elapsed;
            Some(rate)
        } else {
            None
        }
    }
}

/// Drives a [`GpuSimulation`] frame by frame.
pub struct Runner {
    sim: GpuSimulation,
    time_step: f32,
    started: Instant,
    rate: FrameRateCounter,
}

impl Runner {
    /// Wrap an assembled simulation with the per-frame time step.
    pub fn new(sim: GpuSimulation, time_step: f32) -> Self {
        Self {
            sim,
            time_step,
            started: Instant::now(),
            rate: FrameRateCounter::default(),
        }
    }

    /// The wrapped simulation.
    pub fn simulation(&self) -> &GpuSimulation {
        &self.sim
    }

    /// Advance one frame and update the frame-rate counter.
    pub fn step_frame(&mut self) -> Result<(), SimError> {
        self.sim.step_frame(self.time_step)?;
        let elapsed = self.started.elapsed().as_secs_f64();
        if let Some(fps) = self.rate.tick(elapsed) {
            tracing::info!(
                fps,
                frames = self.sim.dispatcher().frames_dispatched(),
                "frame rate"
            );
        }
        Ok(())
    }

    /// Run `max_frames` frames back to back. Stops at the first error;
    /// every error kind is fatal to the run.
    pub fn run(&mut self, max_frames: u64) -> Result<(), SimError> {
        for _ in 0..max_frames {
            self.step_frame()?;
        }
        tracing::info!(
            frames = self.sim.dispatcher().frames_dispatched(),
            "run complete"
        );
        Ok(())
    }
}
