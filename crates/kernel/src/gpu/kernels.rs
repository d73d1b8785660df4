//! Kernel binding: entry-point resolution and argument layout.
//!
//! Argument indices are positional and must match the kernel signature
//! exactly; the canonical binding table lives in [`ARGUMENT_TABLE`] and is
//! validated against the buffer set before any pipeline is created, so the
//! mismatches the device would only report at enqueue time are caught here
//! with the binding index and expected role spelled out.

use crate::error::SimError;

use super::buffers::{BufferVariant, SharedBuffers};
use super::context::GpuContext;
use super::program::Program;

/// Entry point every program must export for the integration step.
pub const UPDATE_ENTRY: &str = "update";
/// Integration entry point used when the respawn buffer variant is active.
pub const UPDATE_RESPAWN_ENTRY: &str = "update_respawn";

/// The canonical positional argument table shared by all kernels.
///
/// Bindings 5 and 6 exist only in the respawn variant and are read-only.
pub const ARGUMENT_TABLE: &[(u32, &str)] = &[
    (0, "frame params uniform (dt, half extent, particle count)"),
    (1, "position buffer (graphics-visible)"),
    (2, "color buffer (graphics-visible)"),
    (3, "force buffer"),
    (4, "velocity buffer"),
    (5, "position seed buffer (respawn variant)"),
    (6, "velocity seed buffer (respawn variant)"),
];

/// Binder configuration.
#[derive(Debug, Clone)]
pub struct BindConfig {
    /// Name of the force kernel entry point to resolve.
    pub force_entry: String,
    /// Local group size the force kernel will be dispatched with.
    pub group_size: u32,
    /// Resolve the respawning update entry point. Requires the buffer set
    /// to carry the seed extension.
    pub respawn: bool,
}

/// Resolved kernel handles with their stable arguments bound.
#[derive(Debug)]
pub struct BoundKernels {
    /// Force kernel: reads positions, writes forces.
    pub force_pipeline: wgpu::ComputePipeline,
    /// Update kernel: integrates velocity/position, applies the boundary
    /// policy, recolors.
    pub update_pipeline: wgpu::ComputePipeline,
    /// The stable argument set, bound once at initialization.
    pub bind_group: wgpu::BindGroup,
    /// Resolved force entry point name.
    pub force_entry: String,
    /// Resolved update entry point name.
    pub update_entry: String,
    /// Local group size for force dispatches.
    pub group_size: u32,
}

impl BoundKernels {
    /// Resolve both entry points from `program` and bind the stable
    /// arguments. Binding twice with the same inputs produces an equivalent
    /// handle set; dispatch behavior is unchanged.
    ///
    /// `config.respawn` selects `update_respawn` instead of `update` and
    /// requires a buffer set allocated with the seed extension.
    pub fn bind(
        ctx: &GpuContext,
        program: &Program,
        buffers: &SharedBuffers,
        config: &BindConfig,
    ) -> Result<Self, SimError> {
        let update_entry = if config.respawn {
            UPDATE_RESPAWN_ENTRY
        } else {
            UPDATE_ENTRY
        };

        // Descriptor check: the respawn signature needs the seed buffers at
        // bindings 5 and 6. Caught here so the mismatch is reported with
        // the binding index and role instead of a generic enqueue failure.
        if config.respawn {
            if buffers.position_seed.is_none() {
                return Err(SimError::ArgumentMismatch {
                    binding: 5,
                    expected: ARGUMENT_TABLE[5].1,
                });
            }
            if buffers.velocity_seed.is_none() {
                return Err(SimError::ArgumentMismatch {
                    binding: 6,
                    expected: ARGUMENT_TABLE[6].1,
                });
            }
        }

        let device = &ctx.device;

        let mut layout_entries = vec![
            bgl_uniform(0),
            bgl_storage_rw(1), // position
            bgl_storage_rw(2), // color
            bgl_storage_rw(3), // force
            bgl_storage_rw(4), // velocity
        ];
        if buffers.variant() == BufferVariant::Respawn {
            layout_entries.push(bgl_storage_ro(5)); // position_seed
            layout_entries.push(bgl_storage_ro(6)); // velocity_seed
        }
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nbody_bgl"),
            entries: &layout_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nbody_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let force_pipeline =
            create_pipeline(ctx, &pipeline_layout, program, &config.force_entry)?;
        let update_pipeline = create_pipeline(ctx, &pipeline_layout, program, update_entry)?;

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffers.params.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: buffers.position.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffers.color.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: buffers.force.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: buffers.velocity.as_entire_binding(),
            },
        ];
        if let (Some(pos_seed), Some(vel_seed)) =
            (&buffers.position_seed, &buffers.velocity_seed)
        {
            entries.push(wgpu::BindGroupEntry {
                binding: 5,
                resource: pos_seed.as_entire_binding(),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: 6,
                resource: vel_seed.as_entire_binding(),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nbody_bg"),
            layout: &bind_group_layout,
            entries: &entries,
        });

        tracing::debug!(
            "bound kernels: force=`{}`, update=`{}`, group_size={}",
            config.force_entry,
            update_entry,
            config.group_size
        );

        Ok(Self {
            force_pipeline,
            update_pipeline,
            bind_group,
            force_entry: config.force_entry.clone(),
            update_entry: update_entry.to_string(),
            group_size: config.group_size,
        })
    }
}

/// Create one compute pipeline, converting the device's validation error
/// into [`SimError::KernelResolution`] naming the entry point.
fn create_pipeline(
    ctx: &GpuContext,
    layout: &wgpu::PipelineLayout,
    program: &Program,
    entry: &str,
) -> Result<wgpu::ComputePipeline, SimError> {
    ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = ctx
        .device
        .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(entry),
            layout: Some(layout),
            module: &program.module,
            entry_point: Some(entry),
            compilation_options: Default::default(),
            cache: None,
        });
    if let Some(e) = pollster::block_on(ctx.device.pop_error_scope()) {
        return Err(SimError::KernelResolution {
            entry: entry.to_string(),
            detail: e.to_string(),
        });
    }
    Ok(pipeline)
}

// ---- Bind group layout entry helpers ----

fn bgl_uniform(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn bgl_storage_rw(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn bgl_storage_ro(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
