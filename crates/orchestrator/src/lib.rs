//! Simulation setup and drive layer.
//!
//! This crate provides everything around the compute core:
//! - Configuration loading and validation (including the refuse-to-start
//!   group-size check)
//! - Initial particle distribution
//! - The frame loop runner
//!
//! # Modules
//! - [`config`] -- serde-based configuration with validation.
//! - [`seed`] -- initial particle state.
//! - [`runner`] -- frame loop with rate reporting.

#![warn(missing_docs)]

pub mod config;
pub mod runner;
pub mod seed;

pub use config::SimulationConfig;
pub use runner::Runner;

use kernel::{GpuContext, GpuSimulation, SimulationOptions};

/// Create a complete simulation from a configuration file.
///
/// Performs the full setup pipeline in dependency order:
/// 1. Load and validate the configuration (group size must divide the
///    particle count, or this refuses to proceed)
/// 2. Discover the device and create the context and queue
/// 3. Seed the initial particle state and upload it into the shared
///    buffer set
/// 4. Build the kernel program and bind the entry points
/// 5. Wrap everything in a [`Runner`]
///
/// Any failure is fatal: the caller aborts startup, and no frame can be
/// dispatched against a partially initialized pipeline.
pub fn create_simulation(config_path: &str) -> Result<Runner, Box<dyn std::error::Error>> {
    tracing::info!("Creating simulation from config: {}", config_path);

    let config = SimulationConfig::load(config_path)?;
    tracing::info!(
        "Configuration loaded: {} ({} particles, group size {})",
        config.name,
        config.particle_count,
        config.group_size
    );

    create_simulation_from_config(&config)
}

/// Create a simulation from an already-validated configuration.
pub fn create_simulation_from_config(
    config: &SimulationConfig,
) -> Result<Runner, Box<dyn std::error::Error>> {
    config.validate()?;

    let kernel_source = match &config.kernel_source {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
            format!("Failed to read kernel source file {}: {}", path, e)
        })?),
        None => None,
    };

    let ctx = GpuContext::initialize(None)?;

    let init = seed::seed_particles(config);

    let sim = GpuSimulation::new(
        ctx,
        &init,
        &SimulationOptions {
            half_extent: config.half_extent,
            group_size: config.group_size,
            force_entry: config.force_kernel.clone(),
            respawn: config.respawn,
            kernel_source,
        },
    )?;

    Ok(Runner::new(sim, config.time_step))
}
