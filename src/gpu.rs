//! # GPU Context (`gpu.rs`)
//!
//! Creates and owns the `wgpu` objects every other module draws with: the window
//! surface, the logical device, its queue, and the surface configuration.
//!
//! ## Initialization
//!
//! [`Gpu::new_async`] walks the usual chain `Instance -> Surface -> Adapter -> Device`.
//! Each step can fail on unsupported hardware, and each failure is reported as a
//! [`ViewerError`] so the application can print it and exit instead of panicking.
//!
//! Once the adapter is known its identity (name, backend, driver) is logged, which is the
//! first thing to look at when the viewer misbehaves on a particular machine.
//!
//! ## Limits
//!
//! The point grid is large. The device is therefore requested with the adapter's own
//! `max_buffer_size` rather than the conservative default, so that the grid splits into as
//! few vertex buffers as possible. Everything else uses the default limits, scaled to the
//! adapter's texture resolution as usual.
//!
//! ## Errors at runtime
//!
//! Validation and out-of-memory errors that are not captured by an error scope are
//! routed to the log instead of aborting the process; rendering keeps going.

use wgpu::InstanceDescriptor;

use crate::ViewerError;

/// Device, queue and surface shared by the renderer and the scene.
pub struct Gpu {
    /// The window's (or canvas') presentable surface.
    pub surface: wgpu::Surface<'static>,
    /// Logical device all buffers, textures and pipelines are created on.
    pub device: wgpu::Device,
    /// Queue for uniform writes and command submission.
    pub queue: wgpu::Queue,
    /// Current surface configuration. Its size tracks the window.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Non-sRGB color format the surface was configured with.
    pub surface_format: wgpu::TextureFormat,
}

impl Gpu {
    /// Width / height of the configured surface.
    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    /// Current surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Reconfigures the surface for a new window size.
    ///
    /// Zero-sized requests (a minimized window) are ignored; configuring a surface with a
    /// zero extent is a validation error.
    ///
    /// # Returns
    ///
    /// `true` if the surface was reconfigured, `false` if the request was ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !is_presentable(width, height) {
            return false;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure();
        true
    }

    /// Applies the current configuration to the surface again, e.g. after it was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Creates a depth texture matching the given size and returns its view.
    pub fn create_depth_texture(
        &self,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> wgpu::TextureView {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Depth Texture View"),
            format: Some(format),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            ..Default::default()
        })
    }

    /// Largest vertex buffer, in bytes, the device accepts.
    pub fn max_buffer_size(&self) -> u64 {
        self.device.limits().max_buffer_size
    }

    /// Initializes the GPU context for `window`.
    ///
    /// # Parameters
    ///
    /// - `window`: anything `wgpu` can create a surface for, usually an `Arc<Window>`.
    /// - `width`, `height`: initial surface size in physical pixels. Zero is raised to one.
    ///
    /// # Errors
    ///
    /// - [`ViewerError::CreateSurface`] if the window cannot back a surface.
    /// - [`ViewerError::NoAdapter`] if no adapter can present to it.
    /// - [`ViewerError::RequestDevice`] if the adapter rejects the requested limits.
    /// - [`ViewerError::UnsupportedSurface`] if the surface reports no usable format,
    ///   present mode or alpha mode for the adapter.
    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, ViewerError> {
        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ViewerError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.device_type);
        log::info!("Backend: {:?}", info.backend);
        log::info!("Driver: {} {}", info.driver, info.driver_info);
        log::debug!("Adapter features: {:#?}", adapter.features());

        #[cfg(not(all(target_arch = "wasm32", feature = "webgl")))]
        let base_limits = wgpu::Limits::default();
        #[cfg(all(target_arch = "wasm32", feature = "webgl"))]
        let base_limits = wgpu::Limits::downlevel_webgl2_defaults();

        let required_limits = wgpu::Limits {
            max_buffer_size: adapter.limits().max_buffer_size,
            ..base_limits.using_resolution(adapter.limits())
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Point Grid Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        device.on_uncaptured_error(Box::new(|error: wgpu::Error| {
            log::error!("GPU error: {error}");
        }));

        let surface_capabilities = surface.get_capabilities(&adapter);
        let (surface_format, present_mode, alpha_mode) =
            choose_surface_settings(&surface_capabilities)?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            surface_format,
        })
    }
}

/// A surface can only be configured with a non-zero extent.
fn is_presentable(width: u32, height: u32) -> bool {
    width > 0 && height > 0
}

/// Picks the surface format, present mode and alpha mode from `capabilities`.
///
/// The first non-sRGB format is preferred because egui expects to write into a linear
/// surface; if the surface offers only sRGB formats the first one is used.
fn choose_surface_settings(
    capabilities: &wgpu::SurfaceCapabilities,
) -> Result<
    (
        wgpu::TextureFormat,
        wgpu::PresentMode,
        wgpu::CompositeAlphaMode,
    ),
    ViewerError,
> {
    let format = capabilities
        .formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| capabilities.formats.first().copied())
        .ok_or(ViewerError::UnsupportedSurface("texture format"))?;
    let present_mode = capabilities
        .present_modes
        .first()
        .copied()
        .ok_or(ViewerError::UnsupportedSurface("present mode"))?;
    let alpha_mode = capabilities
        .alpha_modes
        .first()
        .copied()
        .ok_or(ViewerError::UnsupportedSurface("alpha mode"))?;
    Ok((format, present_mode, alpha_mode))
}
