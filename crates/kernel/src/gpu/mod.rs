//! GPU pipeline: device context, shared buffers, program, kernels, dispatch.
//!
//! `GpuSimulation` wires the five components in dependency order:
//!
//! 1. [`context::GpuContext`] — device + single in-order queue, created for
//!    interop with the active graphics target.
//! 2. [`buffers::SharedBuffers`] — particle attribute buffers; position and
//!    color are graphics-visible, force and velocity are compute-only.
//! 3. [`program::Program`] — kernel source compiled with the tile size
//!    injected as a compile-time constant.
//! 4. [`kernels::BoundKernels`] — named entry points resolved into
//!    pipelines with their stable arguments bound once.
//! 5. [`dispatch::FrameDispatcher`] — the per-frame acquire / force /
//!    update / release protocol.

pub mod buffers;
pub mod context;
pub mod dispatch;
pub mod kernels;
pub mod program;

use crate::error::SimError;
use crate::particle::ParticleInit;

use buffers::{BufferVariant, RenderHandles, SharedBuffers};
use context::GpuContext;
use dispatch::FrameDispatcher;
use kernels::{BindConfig, BoundKernels};
use program::{Program, ProgramConfig};

/// The kernel source shipped with the crate.
pub const DEFAULT_KERNEL_SOURCE: &str = include_str!("shaders/nbody.wgsl");

/// Options for assembling a [`GpuSimulation`].
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Bounding-box half-extent for the boundary reflection policy.
    pub half_extent: f32,
    /// Local group size for the force kernel; must evenly divide the
    /// particle count.
    pub group_size: u32,
    /// Force kernel entry point name.
    pub force_entry: String,
    /// Allocate the respawn buffer extension and bind `update_respawn`.
    pub respawn: bool,
    /// Kernel source text; `None` uses [`DEFAULT_KERNEL_SOURCE`].
    pub kernel_source: Option<String>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            half_extent: 50.0,
            group_size: 32,
            force_entry: "force_naive".to_string(),
            respawn: false,
            kernel_source: None,
        }
    }
}

/// The assembled compute/render pipeline for one simulation run.
///
/// Owns the context, buffers, compiled program handles, and dispatcher; no
/// hidden statics. Created once at startup, torn down at process exit.
pub struct GpuSimulation {
    ctx: GpuContext,
    buffers: SharedBuffers,
    kernels: BoundKernels,
    dispatcher: FrameDispatcher,
}

impl GpuSimulation {
    /// Assemble the full pipeline from an already-initialized context and
    /// CPU-side initial state.
    ///
    /// Initialization failures short-circuit: on `Err` no partially
    /// initialized simulation escapes and no frame can be dispatched.
    pub fn new(
        ctx: GpuContext,
        init: &ParticleInit,
        options: &SimulationOptions,
    ) -> Result<Self, SimError> {
        let variant = if options.respawn {
            BufferVariant::Respawn
        } else {
            BufferVariant::Standard
        };
        let buffers = SharedBuffers::load_data(&ctx, init, variant)?;

        let source = options
            .kernel_source
            .as_deref()
            .unwrap_or(DEFAULT_KERNEL_SOURCE);
        let program = Program::build(
            &ctx,
            source,
            &ProgramConfig {
                tile_size: options.group_size,
            },
        )?;

        let kernels = BoundKernels::bind(
            &ctx,
            &program,
            &buffers,
            &BindConfig {
                force_entry: options.force_entry.clone(),
                group_size: options.group_size,
                respawn: options.respawn,
            },
        )?;

        let dispatcher = FrameDispatcher::new(options.half_extent);

        tracing::info!(
            particles = buffers.particle_count(),
            group_size = options.group_size,
            force_kernel = %kernels.force_entry,
            "simulation pipeline ready"
        );

        Ok(Self {
            ctx,
            buffers,
            kernels,
            dispatcher,
        })
    }

    /// Advance the simulation by one frame with time step `dt`.
    pub fn step_frame(&mut self, dt: f32) -> Result<(), SimError> {
        self.dispatcher
            .run_frame(&self.ctx, &self.buffers, &self.kernels, dt)
    }

    /// The device context.
    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// The shared buffer set.
    pub fn buffers(&self) -> &SharedBuffers {
        &self.buffers
    }

    /// The dispatcher (ownership state and frame count).
    pub fn dispatcher(&self) -> &FrameDispatcher {
        &self.dispatcher
    }

    /// Particle count, fixed at creation.
    pub fn particle_count(&self) -> u32 {
        self.buffers.particle_count()
    }

    /// Buffer identifiers for the render collaborator.
    pub fn render_handles(&self) -> RenderHandles<'_> {
        self.buffers.render_handles()
    }
}
