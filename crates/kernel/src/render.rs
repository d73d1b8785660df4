//! Render collaborator: draws the shared buffers as point primitives.
//!
//! The renderer binds the simulation's position and color buffers directly
//! as vertex attribute sources — no copy between simulation and rendering.
//! Drawing is only legal while the graphics domain owns the shared buffers,
//! i.e. strictly after the dispatcher's release step for the frame; the
//! `draw` entry point enforces that.

use wgpu::util::DeviceExt;

use crate::error::{DispatchError, SimError};
use crate::gpu::buffers::RenderHandles;
use crate::gpu::context::GpuContext;
use crate::gpu::dispatch::FrameDispatcher;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ViewParams {
    scale: f32,
    _pad: [f32; 3],
}

/// Point-primitive renderer over the graphics-visible particle buffers.
pub struct PointRenderer {
    pipeline: wgpu::RenderPipeline,
    view_bind_group: wgpu::BindGroup,
}

impl PointRenderer {
    /// Build the render pipeline for `target_format`. `half_extent` sets
    /// the uniform scale that maps the simulation bounding box into clip
    /// space.
    pub fn new(ctx: &GpuContext, target_format: wgpu::TextureFormat, half_extent: f32) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points"),
            source: wgpu::ShaderSource::Wgsl(include_str!("gpu/shaders/points.wgsl").into()),
        });

        let view_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("view_params"),
            contents: bytemuck::bytes_of(&ViewParams {
                scale: 1.0 / half_extent.max(f32::EPSILON),
                _pad: [0.0; 3],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let view_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("points_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let view_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("points_bg"),
            layout: &view_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: view_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("points_pl"),
            bind_group_layouts: &[&view_bgl],
            push_constant_ranges: &[],
        });

        // Two vertex buffers, one attribute each: the particle buffers are
        // bound as-is, 16-byte stride.
        let vertex_layouts = [
            wgpu::VertexBufferLayout {
                array_stride: 16,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: 16,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 0,
                    shader_location: 1,
                }],
            },
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("points"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &vertex_layouts,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            view_bind_group,
        }
    }

    /// Issue one point-list draw of the particle set into `target`.
    ///
    /// Fails with a dispatch error if the compute domain still holds the
    /// shared buffers.
    pub fn draw(
        &self,
        ctx: &GpuContext,
        handles: &RenderHandles<'_>,
        dispatcher: &FrameDispatcher,
        target: &wgpu::TextureView,
    ) -> Result<(), SimError> {
        if !dispatcher.graphics_owns_buffers() {
            return Err(DispatchError::WrongPhase { owner: "compute" }.into());
        }

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("points"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("points"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.view_bind_group, &[]);
            pass.set_vertex_buffer(0, handles.position.slice(..));
            pass.set_vertex_buffer(1, handles.color.slice(..));
            pass.draw(0..handles.count, 0..1);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
