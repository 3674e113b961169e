//! # `renderer.rs` - Renderer Module
//!
//! The [`Renderer`] ties together the [`Gpu`] context, the point [`Scene`] and the `egui`
//! overlay renderer, and turns them into one presented frame per call to
//! [`Renderer::render_frame`].
//!
//! ## Frame anatomy
//!
//! 1. `egui` texture uploads and frees requested by the last GUI pass are applied.
//! 2. The current surface texture is acquired.
//! 3. A single render pass clears color to black and depth to `1.0`, draws the points, and
//!    draws the overlay on top.
//! 4. The command buffer is submitted and the frame presented.
//!
//! The scene is advanced separately through [`Renderer::update`], before the GUI pass, so
//! the overlay shows the camera state of the frame being drawn.
//!
//! ## Surface errors
//!
//! Acquiring the surface texture can fail for transient reasons. A `Lost` or `Outdated`
//! surface is reconfigured and the frame skipped; a `Timeout` just skips the frame. Only
//! running out of memory is reported to the caller, which ends the application.

use crate::config::ViewerConfig;
use crate::gpu::Gpu;
use crate::input::InputState;
use crate::scene::Scene;
use crate::ViewerError;

/// Renders the point scene and the `egui` overlay into the window surface.
pub struct Renderer {
    /// Device, queue and surface.
    gpu: Gpu,

    /// Depth buffer view matching the surface size. Recreated on resize.
    depth_texture_view: wgpu::TextureView,

    /// Draws `egui` paint jobs into the same pass as the scene.
    egui_renderer: egui_wgpu::Renderer,

    /// The points, their pipeline and the camera.
    scene: Scene,
}

impl Renderer {
    /// Depth buffer format shared by the scene pipeline and the overlay renderer.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// The clear color behind the points.
    pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

    /// Creates the GPU context for `window`, uploads the grid and builds all pipelines.
    ///
    /// Fails when no suitable adapter or device is available, or when the camera settings
    /// in `config` are rejected.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        config: &ViewerConfig,
    ) -> Result<Self, ViewerError> {
        let gpu = Gpu::new_async(window, width, height).await?;

        let (surface_width, surface_height) = gpu.size();
        let depth_texture_view =
            gpu.create_depth_texture(surface_width, surface_height, Self::DEPTH_FORMAT);

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            Some(Self::DEPTH_FORMAT),
            1,
            false,
        );

        let scene = Scene::new(
            &gpu.device,
            gpu.surface_format,
            gpu.max_buffer_size(),
            gpu.aspect_ratio(),
            config,
        )?;

        Ok(Self {
            gpu,
            depth_texture_view,
            egui_renderer,
            scene,
        })
    }

    /// The scene being drawn, for read-only access such as the overlay.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Resizes the surface and the depth buffer.
    ///
    /// # Returns
    ///
    /// `false` if the size was ignored because one side is zero (a minimized window).
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.gpu.resize(width, height) {
            return false;
        }
        self.depth_texture_view = self
            .gpu
            .create_depth_texture(width, height, Self::DEPTH_FORMAT);
        true
    }

    /// Advances the scene by `delta_time` using the input gathered since the last frame.
    pub fn update(
        &mut self,
        input: &mut InputState,
        delta_time: crate::Duration,
        mouse_look: bool,
    ) {
        self.scene.update(
            &self.gpu.queue,
            self.gpu.aspect_ratio(),
            input,
            delta_time.as_secs_f32(),
            mouse_look,
        );
    }

    /// Draws the scene and the overlay and presents the result.
    pub fn render_frame(
        &mut self,
        screen_descriptor: egui_wgpu::ScreenDescriptor,
        paint_jobs: Vec<egui::epaint::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
    ) -> Result<(), ViewerError> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }

        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                self.free_textures(&textures_delta);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(ViewerError::SurfaceOutOfMemory),
            Err(err) => {
                log::warn!("Skipping frame: {err}");
                self.free_textures(&textures_delta);
                return Ok(());
            }
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Surface Texture View"),
                    format: Some(self.gpu.surface_format),
                    ..Default::default()
                });

        encoder.insert_debug_marker("Render points");

        // The pass must be dropped before `encoder.finish()`.
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Self::CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.scene.render(&mut render_pass);

            self.egui_renderer.render(
                &mut render_pass.forget_lifetime(),
                &paint_jobs,
                &screen_descriptor,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        self.free_textures(&textures_delta);
        Ok(())
    }

    fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
