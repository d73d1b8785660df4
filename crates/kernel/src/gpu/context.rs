//! Device and queue acquisition.
//!
//! One `GpuContext` exists per run. It owns the device and the single
//! in-order command queue every compute and render command goes through;
//! sharing one device/queue pair between the compute passes and the point
//! renderer is what makes the particle buffers visible to both domains
//! without a CPU copy.

use crate::error::SimError;

/// Owns the wgpu device and command queue for the lifetime of the run.
pub struct GpuContext {
    /// Logical device. All buffers, pipelines, and encoders come from here.
    pub device: wgpu::Device,
    /// The single in-order command queue.
    pub queue: wgpu::Queue,
    /// Adapter info captured at initialization, for diagnostics.
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Discover a compute-capable adapter and create the device and queue.
    ///
    /// When `compatible_surface` is given, adapter selection is constrained
    /// to the adapter driving that surface — interop with the active
    /// graphics target is established here, at creation time, and is not
    /// renegotiated later.
    ///
    /// Any failure is fatal to the run: callers must abort startup rather
    /// than continue with a partially initialized context.
    pub fn initialize(compatible_surface: Option<&wgpu::Surface<'_>>) -> Result<Self, SimError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface,
            force_fallback_adapter: false,
        }))
        .ok_or(SimError::DeviceDiscovery)?;

        let adapter_info = adapter.get_info();
        tracing::info!(
            "GPU adapter: {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("nbody_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .map_err(|e| SimError::ContextCreation(e.to_string()))?;

        Ok(Self {
            device,
            queue,
            adapter_info,
        })
    }

    /// Block the host thread until all submitted device work has completed.
    ///
    /// This is the synchronization primitive behind the acquire/release
    /// protocol and the post-upload residency barrier.
    pub fn wait_idle(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }
}
