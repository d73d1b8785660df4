//! Per-frame dispatch and the cross-domain ownership protocol.
//!
//! One in-order queue serializes all compute work; the graphics domain is
//! only ever allowed to touch the shared buffers between frames. The
//! dispatcher walks the ownership state machine once per rendered frame:
//!
//! `GraphicsOwnsBuffers -> ComputeAcquiring -> ComputeDispatching ->
//! ComputeReleasing -> GraphicsOwnsBuffers`
//!
//! Every transition that hands memory across domains blocks the host until
//! the device is idle. No frame pipelining: simplicity and strict ordering
//! over throughput.

use crate::error::{DispatchError, SimError};

use super::buffers::{FrameParams, SharedBuffers};
use super::context::GpuContext;
use super::kernels::BoundKernels;

/// Group width used for the update kernel's default grouping. Must match
/// the `@workgroup_size` on the update entry points in the kernel source.
const UPDATE_GROUP: u32 = 256;

/// Runs the acquire/dispatch/release protocol each frame.
pub struct FrameDispatcher {
    owner: Owner,
    half_extent: f32,
    frame_index: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Graphics,
    Compute,
}

impl FrameDispatcher {
    /// Create a dispatcher. `half_extent` is the boundary scalar passed to
    /// the update kernel; buffers start out owned by the graphics domain.
    pub fn new(half_extent: f32) -> Self {
        Self {
            owner: Owner::Graphics,
            half_extent,
            frame_index: 0,
        }
    }

    /// Number of frames dispatched so far.
    pub fn frames_dispatched(&self) -> u64 {
        self.frame_index
    }

    /// `true` while the graphics domain owns the shared buffers (the only
    /// phase in which the render collaborator may draw).
    pub fn graphics_owns_buffers(&self) -> bool {
        self.owner == Owner::Graphics
    }

    /// Run one frame: acquire the shared buffers for compute, dispatch the
    /// force kernel then the update kernel, release the buffers back to the
    /// graphics domain, and block until all device work for the frame has
    /// completed.
    ///
    /// Force-before-update ordering is a correctness invariant: the update
    /// kernel integrates the force buffer written earlier in the same
    /// frame.
    pub fn run_frame(
        &mut self,
        ctx: &GpuContext,
        buffers: &SharedBuffers,
        kernels: &BoundKernels,
        dt: f32,
    ) -> Result<(), SimError> {
        if self.owner != Owner::Graphics {
            return Err(DispatchError::WrongPhase { owner: "compute" }.into());
        }

        let n = buffers.particle_count();
        let group_size = kernels.group_size;
        if group_size == 0 || n % group_size != 0 {
            return Err(DispatchError::GroupSizeMismatch {
                particle_count: n,
                group_size,
            }
            .into());
        }

        // Barrier: all pending graphics commands complete, then the compute
        // domain takes ownership.
        tracing::trace!(frame = self.frame_index, "acquiring shared buffers");
        ctx.wait_idle();
        self.owner = Owner::Compute;

        // Rebind the per-frame variable argument.
        buffers.write_frame_params(
            &ctx.queue,
            &FrameParams {
                dt,
                half_extent: self.half_extent,
                particle_count: n,
                _pad: 0,
            },
        );

        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });

        // Force kernel: exact division, no bounds guard in the tiled path.
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("force"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&kernels.force_pipeline);
            pass.set_bind_group(0, &kernels.bind_group, &[]);
            pass.dispatch_workgroups(n / group_size, 1, 1);
        }

        // Update kernel: default grouping, bounds-guarded in the shader.
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("update"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&kernels.update_pipeline);
            pass.set_bind_group(0, &kernels.bind_group, &[]);
            pass.dispatch_workgroups(dispatch_size(n, UPDATE_GROUP), 1, 1);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));

        // Release: drain the queue, then ownership returns to graphics.
        ctx.wait_idle();
        let enqueue_error = pollster::block_on(ctx.device.pop_error_scope());
        self.owner = Owner::Graphics;

        if let Some(e) = enqueue_error {
            return Err(DispatchError::Device(format!(
                "force=`{}` update=`{}`: {e}",
                kernels.force_entry, kernels.update_entry
            ))
            .into());
        }

        self.frame_index += 1;
        tracing::trace!(frame = self.frame_index, "released shared buffers");
        Ok(())
    }
}

/// Workgroup count for a bounds-guarded dispatch: ceil(total / group).
fn dispatch_size(total: u32, group: u32) -> u32 {
    (total + group - 1) / group
}

#[cfg(test)]
mod tests {
    use super::dispatch_size;

    #[test]
    fn dispatch_size_rounds_up() {
        assert_eq!(dispatch_size(1024, 256), 4);
        assert_eq!(dispatch_size(1000, 256), 4);
        assert_eq!(dispatch_size(1, 256), 1);
        assert_eq!(dispatch_size(257, 256), 2);
    }
}
