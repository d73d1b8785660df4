//! Shared buffer set: particle attribute storage on the device.
//!
//! Two of the buffers (position, color) are graphics-visible — they carry
//! `VERTEX` usage on top of `STORAGE` so the rasterizer binds them directly
//! as vertex attribute sources. Force and velocity are compute-only scratch
//! state. All buffers hold exactly `n` 16-byte `Vec4` records; `n` is fixed
//! at creation for the lifetime of the run.

use wgpu::util::DeviceExt;

use crate::error::SimError;
use crate::particle::{ParticleInit, Vec4};

use super::context::GpuContext;

/// Per-frame kernel parameters, rewritten each dispatch.
///
/// Must match the `Params` struct declared in the kernel source exactly.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameParams {
    /// Time step for this frame (the per-frame variable argument).
    pub dt: f32,
    /// Bounding-box half-extent used by the boundary reflection policy.
    pub half_extent: f32,
    /// Particle count (global work size).
    pub particle_count: u32,
    /// Padding to a 16-byte uniform stride.
    pub _pad: u32,
}

/// Which buffer schema to allocate.
///
/// The required set (position, color, force, velocity) is always present;
/// `Respawn` adds the read-only seed copies consumed by the respawning
/// update kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferVariant {
    /// Required buffers only.
    Standard,
    /// Required buffers plus position/velocity seed copies.
    Respawn,
}

/// Particle attribute selector for readback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// Graphics-visible position buffer.
    Position,
    /// Graphics-visible color buffer.
    Color,
    /// Compute-only force buffer.
    Force,
    /// Compute-only velocity buffer.
    Velocity,
}

/// Buffer identifiers handed to the render collaborator.
///
/// The renderer binds these directly as vertex/color attribute sources and
/// draws `count` point primitives; no data is copied between simulation and
/// rendering.
pub struct RenderHandles<'a> {
    /// Position buffer (vertex attribute 0, `float32x4`).
    pub position: &'a wgpu::Buffer,
    /// Color buffer (vertex attribute 1, `float32x4`).
    pub color: &'a wgpu::Buffer,
    /// Number of particles to draw.
    pub count: u32,
}

/// All device buffers for the particle system.
#[derive(Debug)]
pub struct SharedBuffers {
    /// Frame params uniform (binding 0).
    pub params: wgpu::Buffer,
    /// Graphics-visible positions (binding 1).
    pub position: wgpu::Buffer,
    /// Graphics-visible colors (binding 2).
    pub color: wgpu::Buffer,
    /// Compute-only accumulated forces (binding 3).
    pub force: wgpu::Buffer,
    /// Compute-only velocities (binding 4).
    pub velocity: wgpu::Buffer,
    /// Respawn variant: initial-position copies (binding 5).
    pub position_seed: Option<wgpu::Buffer>,
    /// Respawn variant: initial-velocity copies (binding 6).
    pub velocity_seed: Option<wgpu::Buffer>,

    // Staging buffers for readback.
    staging_position: wgpu::Buffer,
    staging_color: wgpu::Buffer,
    staging_force: wgpu::Buffer,
    staging_velocity: wgpu::Buffer,

    variant: BufferVariant,
    n: u32,
}

impl SharedBuffers {
    /// Create and populate the full buffer set from CPU-side initial state.
    ///
    /// Preconditions: all four attribute arrays in `init` have equal,
    /// nonzero length. The graphics-visible pair is created first and a
    /// full device synchronization runs before the compute-only set is
    /// allocated, so the vertex data is resident before the compute domain
    /// can claim it. There is no partial-success state: any failure tears
    /// the whole set down via `Err`.
    pub fn load_data(
        ctx: &GpuContext,
        init: &ParticleInit,
        variant: BufferVariant,
    ) -> Result<Self, SimError> {
        if init.is_empty() {
            return Err(SimError::BufferAllocation(
                "initial particle set is empty".into(),
            ));
        }
        if !init.lengths_match() {
            return Err(SimError::BufferAllocation(format!(
                "attribute arrays must have equal length: positions={} forces={} \
                 velocities={} colors={}",
                init.positions.len(),
                init.forces.len(),
                init.velocities.len(),
                init.colors.len()
            )));
        }

        let n = init.len() as u32;
        let byte_size = u64::from(n) * std::mem::size_of::<Vec4>() as u64;
        let device = &ctx.device;

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        // Graphics-visible pair: vertex data lives here from the start.
        let shared_usage = wgpu::BufferUsages::VERTEX
            | wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST;
        let position = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("position"),
            contents: bytemuck::cast_slice(&init.positions),
            usage: shared_usage,
        });
        let color = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("color"),
            contents: bytemuck::cast_slice(&init.colors),
            usage: shared_usage,
        });

        // The shared data must be resident before the compute domain may
        // claim the buffers.
        ctx.wait_idle();

        let compute_usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST;
        let force = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("force"),
            size: byte_size,
            usage: compute_usage,
            mapped_at_creation: false,
        });
        let velocity = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("velocity"),
            size: byte_size,
            usage: compute_usage,
            mapped_at_creation: false,
        });

        let (position_seed, velocity_seed) = match variant {
            BufferVariant::Standard => (None, None),
            BufferVariant::Respawn => {
                let pos_seed = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("position_seed"),
                    contents: bytemuck::cast_slice(&init.positions),
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                });
                let vel_seed = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("velocity_seed"),
                    contents: bytemuck::cast_slice(&init.velocities),
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                });
                (Some(pos_seed), Some(vel_seed))
            }
        };

        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_params"),
            contents: bytemuck::bytes_of(&FrameParams {
                dt: 0.0,
                half_extent: 0.0,
                particle_count: n,
                _pad: 0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let staging_position = create_staging(device, "staging_position", byte_size);
        let staging_color = create_staging(device, "staging_color", byte_size);
        let staging_force = create_staging(device, "staging_force", byte_size);
        let staging_velocity = create_staging(device, "staging_velocity", byte_size);

        // Blocking upload of the compute-only initial content.
        ctx.queue.write_buffer(&force, 0, bytemuck::cast_slice(&init.forces));
        ctx.queue
            .write_buffer(&velocity, 0, bytemuck::cast_slice(&init.velocities));
        ctx.queue.submit(std::iter::empty());
        ctx.wait_idle();

        let validation = pollster::block_on(device.pop_error_scope());
        let oom = pollster::block_on(device.pop_error_scope());
        if let Some(e) = oom.or(validation) {
            return Err(SimError::BufferAllocation(e.to_string()));
        }

        tracing::debug!(
            "allocated particle buffers: n={}, {} bytes per attribute",
            n,
            byte_size
        );

        Ok(Self {
            params,
            position,
            color,
            force,
            velocity,
            position_seed,
            velocity_seed,
            staging_position,
            staging_color,
            staging_force,
            staging_velocity,
            variant,
            n,
        })
    }

    /// Particle count, fixed at creation.
    pub fn particle_count(&self) -> u32 {
        self.n
    }

    /// Size in bytes of each attribute buffer.
    pub fn attribute_size(&self) -> u64 {
        u64::from(self.n) * std::mem::size_of::<Vec4>() as u64
    }

    /// Which schema this set was allocated with.
    pub fn variant(&self) -> BufferVariant {
        self.variant
    }

    /// Buffer identifiers for the render collaborator.
    pub fn render_handles(&self) -> RenderHandles<'_> {
        RenderHandles {
            position: &self.position,
            color: &self.color,
            count: self.n,
        }
    }

    /// Rewrite the frame params uniform (the per-frame variable argument).
    pub fn write_frame_params(&self, queue: &wgpu::Queue, params: &FrameParams) {
        queue.write_buffer(&self.params, 0, bytemuck::bytes_of(params));
    }

    /// Read one attribute buffer back to the CPU. Blocks until the copy and
    /// map complete. Used by tests and diagnostics; the frame loop never
    /// reads back.
    pub fn read_attribute(&self, ctx: &GpuContext, attribute: Attribute) -> Vec<Vec4> {
        let (source, staging) = match attribute {
            Attribute::Position => (&self.position, &self.staging_position),
            Attribute::Color => (&self.color, &self.staging_color),
            Attribute::Force => (&self.force, &self.staging_force),
            Attribute::Velocity => (&self.velocity, &self.staging_velocity),
        };

        let byte_size = self.attribute_size();
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback"),
            });
        encoder.copy_buffer_to_buffer(source, 0, staging, 0, byte_size);
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.wait_idle();
        rx.recv()
            .expect("map_async callback dropped")
            .expect("staging buffer map failed");

        let data = slice.get_mapped_range();
        let out: Vec<Vec4> = bytemuck::cast_slice(&data)[..self.n as usize].to_vec();
        drop(data);
        staging.unmap();
        out
    }
}

fn create_staging(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
