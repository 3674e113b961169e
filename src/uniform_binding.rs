//! # Uniform Binding (`uniform_binding.rs`)
//!
//! Owns the GPU side of the [`UniformBuffer`]: the buffer itself, the bind group layout
//! the pipeline is built against, and the bind group set at draw time. The binding lives
//! at `@group(0) @binding(0)` and is only visible to the vertex stage, which is the only
//! stage that transforms points.

use wgpu::util::DeviceExt;

use crate::uniform_buffer::UniformBuffer;

/// Buffer, layout and bind group for the per-frame matrices.
pub struct UniformBinding {
    /// 128-byte uniform buffer, rewritten every frame.
    pub buffer: wgpu::Buffer,
    /// Bind group set at draw time.
    pub bind_group: wgpu::BindGroup,
    /// Layout the pipeline is created against.
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl UniformBinding {
    /// Creates the uniform buffer initialized with identity matrices.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::bytes_of(&UniformBuffer::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<UniformBuffer>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Schedules `uniforms` to be written before the next submitted command buffer runs.
    pub fn update(&self, queue: &wgpu::Queue, uniforms: &UniformBuffer) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniforms));
    }
}
