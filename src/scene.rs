//! # Scene (`scene.rs`)
//!
//! The scene is everything that gets drawn: the point grid uploaded as one or more vertex
//! buffers, the camera looking at it, and the render pipeline that turns points into
//! pixels.
//!
//! ## Per-frame flow
//!
//! 1. [`Scene::update`] applies the frame's input to the camera through the
//!    [`CameraController`], advances the optional spin of the grid, and writes the new
//!    `camera` and `model` matrices into the uniform buffer.
//! 2. [`Scene::render`] binds the pipeline and uniforms and issues one non-indexed draw per
//!    point buffer.
//!
//! ## Pipeline
//!
//! Points are drawn with the `PointList` topology (one pixel per point, `wgpu` has no
//! point size), depth-tested with `Less` so nearer points hide farther ones, and alpha
//! blended so translucent colors compose over the black background.

use nalgebra_glm as glm;
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::controller::CameraController;
use crate::input::InputState;
use crate::point_grid::PointGrid;
use crate::renderer::Renderer;
use crate::uniform_binding::UniformBinding;
use crate::uniform_buffer::UniformBuffer;
use crate::vertex::Vertex;
use crate::{ViewerError, SHADER_SOURCE};

/// Upper bound on points generated into one buffer, which bounds the transient host
/// allocation during upload (about 117 MB) independently of the device limit.
pub const MAX_POINTS_PER_BUFFER: u32 = 1 << 22;

/// One uploaded slice of the grid.
pub struct PointBuffer {
    /// Vertex buffer holding [`Vertex`] data for a contiguous index range of the grid.
    pub buffer: wgpu::Buffer,
    /// Number of vertices in `buffer`.
    pub point_count: u32,
}

/// The drawable state: grid buffers, pipeline, camera and its controller.
pub struct Scene {
    /// Camera the grid is viewed through.
    pub camera: Camera,
    /// Applies per-frame input to `camera`.
    pub controller: CameraController,
    /// Dimensions of the uploaded grid.
    pub grid: PointGrid,
    /// The grid split into buffers that fit the device limits.
    pub point_buffers: Vec<PointBuffer>,
    /// `camera` and `model` matrices at group 0.
    pub uniform: UniformBinding,
    /// Point-list pipeline built from [`SHADER_SOURCE`].
    pub pipeline: wgpu::RenderPipeline,
    /// Current rotation of the grid around +Y, in degrees.
    pub degrees_rotated: f32,
    /// Spin rate of the grid in degrees per second.
    pub spin_degrees_per_second: f32,
}

impl Scene {
    /// Generates the grid, uploads it and builds the pipeline.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        max_buffer_size: u64,
        aspect_ratio: f32,
        config: &ViewerConfig,
    ) -> Result<Self, ViewerError> {
        let mut camera = Camera::default();
        camera.set_position(glm::Vec3::from(config.camera_position));
        camera.set_field_of_view(config.field_of_view)?;
        camera.set_near_and_far_planes(config.near_plane, config.far_plane)?;
        camera.set_viewport_aspect_ratio(aspect_ratio)?;

        let grid = PointGrid::new(config.grid_width, config.grid_height, config.grid_depth)?;
        let point_buffers = Self::upload_grid(device, &grid, max_buffer_size);

        let uniform = UniformBinding::new(device);
        let pipeline = Self::create_pipeline(device, surface_format, &uniform);

        Ok(Self {
            camera,
            controller: CameraController::from_config(config),
            grid,
            point_buffers,
            uniform,
            pipeline,
            degrees_rotated: 0.0,
            spin_degrees_per_second: config.spin_degrees_per_second,
        })
    }

    /// Number of points the scene draws each frame.
    pub fn point_count(&self) -> u32 {
        self.point_buffers.iter().map(|b| b.point_count).sum()
    }

    /// Model matrix rotating the grid by the accumulated spin around +Y.
    pub fn model(&self) -> glm::Mat4 {
        glm::rotate(
            &glm::Mat4::identity(),
            self.degrees_rotated.to_radians(),
            &glm::vec3(0.0, 1.0, 0.0),
        )
    }

    /// Advances the scene by `delta_time` seconds and uploads the new matrices.
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        aspect_ratio: f32,
        input: &mut InputState,
        delta_time: f32,
        mouse_look: bool,
    ) {
        if let Err(err) = self.camera.set_viewport_aspect_ratio(aspect_ratio) {
            log::warn!("Keeping previous aspect ratio: {err}");
        }

        self.controller
            .update(&mut self.camera, input, delta_time, mouse_look);

        self.degrees_rotated = advance_rotation(
            self.degrees_rotated,
            self.spin_degrees_per_second,
            delta_time,
        );

        self.uniform.update(
            queue,
            &UniformBuffer {
                camera: self.camera.matrix(),
                model: self.model(),
            },
        );
    }

    /// Records one draw per point buffer into `render_pass`.
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform.bind_group, &[]);
        for point_buffer in &self.point_buffers {
            render_pass.set_vertex_buffer(0, point_buffer.buffer.slice(..));
            render_pass.draw(0..point_buffer.point_count, 0..1);
        }
    }

    fn upload_grid(
        device: &wgpu::Device,
        grid: &PointGrid,
        max_buffer_size: u64,
    ) -> Vec<PointBuffer> {
        let max_points = points_per_buffer(max_buffer_size);
        let started = web_time::Instant::now();

        let point_buffers: Vec<PointBuffer> = grid
            .chunks(max_points)
            .enumerate()
            .map(|(index, range)| {
                let vertices: Vec<Vertex> = grid.vertices(range).collect();
                let label = format!("Point Buffer {index}");
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label.as_str()),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                PointBuffer {
                    buffer,
                    point_count: vertices.len() as u32,
                }
            })
            .collect();

        log::info!(
            "Uploaded {} points ({}x{}x{}) in {} buffer(s) in {:.2?}",
            grid.point_count(),
            grid.width(),
            grid.height(),
            grid.depth(),
            point_buffers.len(),
            started.elapsed()
        );

        point_buffers
    }

    fn create_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        uniform: &UniformBinding,
    ) -> wgpu::RenderPipeline {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(SHADER_SOURCE)),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&uniform.bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: Some("vertex_main"),
                buffers: &[Vertex::description()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // points have no facing
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Renderer::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: Some("fragment_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    }
}

/// How many vertices fit into one buffer of at most `max_buffer_size` bytes.
fn points_per_buffer(max_buffer_size: u64) -> u32 {
    let by_device = (max_buffer_size / Vertex::SIZE).min(u64::from(u32::MAX)) as u32;
    by_device.clamp(1, MAX_POINTS_PER_BUFFER)
}

/// Advances a rotation by `rate * seconds` degrees and wraps it into `[0, 360)`.
fn advance_rotation(degrees: f32, rate: f32, seconds: f32) -> f32 {
    let degrees = (degrees + rate * seconds).rem_euclid(360.0);
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}
