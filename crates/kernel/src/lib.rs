//! GPU-resident N-body particle simulation kernel.
//!
//! Per-particle state (position, velocity, accumulated force, color) lives
//! in device memory; compute kernels advance it each frame and the same
//! buffers feed the rasterizer directly as vertex data. The crate covers
//! the interop-synchronized compute/render pipeline: device/context
//! acquisition, the shared-buffer lifecycle between the compute and
//! graphics domains, kernel program loading and argument binding, and the
//! per-frame dispatch/synchronization protocol.
//!
//! # Modules
//! - [`particle`] -- `Vec4` records and CPU-side initial state.
//! - [`error`] -- the device-facing error taxonomy; everything is fatal.
//! - [`gpu`] -- context, buffers, program loader, kernel binder, frame
//!   dispatcher, and the `GpuSimulation` aggregate.
//! - [`render`] -- the point-primitive render collaborator.

#![warn(missing_docs)]

pub mod error;
pub mod gpu;
pub mod particle;
pub mod render;

pub use error::{DispatchError, SimError};
pub use gpu::buffers::{Attribute, BufferVariant, FrameParams, RenderHandles, SharedBuffers};
pub use gpu::context::GpuContext;
pub use gpu::dispatch::FrameDispatcher;
pub use gpu::kernels::{BindConfig, BoundKernels, ARGUMENT_TABLE, UPDATE_ENTRY, UPDATE_RESPAWN_ENTRY};
pub use gpu::program::{Program, ProgramConfig};
pub use gpu::{GpuSimulation, SimulationOptions, DEFAULT_KERNEL_SOURCE};
pub use particle::{ParticleInit, Vec4};
pub use render::PointRenderer;
