//! # Point Grid Viewer
//!
//! An interactive viewer for a dense, regular grid of colored points, rendered with
//! `wgpu` from a free-flying first-person camera.
//!
//! At startup the viewer generates a `width x height x depth` grid of points centered on
//! the origin (256^3 by default, about 16.7 million points), colors each point by its
//! normalized grid coordinate, and uploads the whole grid to the GPU once. Every frame it
//! then applies keyboard and mouse input to the camera and draws all points.
//!
//! ## Modules
//!
//! - [`app`]: `winit` application handler, window and input routing.
//! - [`renderer`]: frame orchestration over the scene and the `egui` overlay.
//! - [`gpu`]: device, queue and surface setup.
//! - [`scene`]: point buffers, render pipeline and per-frame uniforms.
//! - [`camera`]: first-person camera orientation and projection math.
//! - [`controller`]: maps input to camera movement, rotation and zoom.
//! - [`input`]: key, mouse-motion and scroll accumulation between frames.
//! - [`point_grid`]: grid generation and chunking for upload.
//! - [`vertex`]: GPU vertex layout.
//! - [`uniform_buffer`], [`uniform_binding`]: the camera/model uniform block.
//! - [`hud`]: the read-only overlay.
//! - [`config`], [`error`]: configuration and error types.
//!
//! ## Controls
//!
//! | input        | action                          |
//! |--------------|---------------------------------|
//! | `W` `A` `S` `D` | move forward / left / back / right |
//! | `Z` / `X`    | move down / up                  |
//! | Shift        | move faster                     |
//! | mouse        | look around                     |
//! | wheel        | zoom                            |
//! | `Tab`        | capture / release the mouse     |
//! | `F1`         | toggle the overlay              |
//! | `Esc`        | quit                            |
//!
//! ## Example
//!
//! ```no_run
//! use point_grid_viewer::{run, ViewerConfig};
//!
//! let config = ViewerConfig {
//!     grid_width: 64,
//!     grid_height: 64,
//!     grid_depth: 64,
//!     ..ViewerConfig::default()
//! };
//! run(config).expect("viewer failed");
//! ```

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod app;
pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod gpu;
pub mod hud;
pub mod input;
pub mod point_grid;
pub mod renderer;
pub mod scene;
pub mod uniform_binding;
pub mod uniform_buffer;
pub mod vertex;

use web_time::Duration;

pub use crate::app::{run, App};
pub use crate::camera::Camera;
pub use crate::config::ViewerConfig;
pub use crate::controller::CameraController;
pub use crate::error::ViewerError;
pub use crate::gpu::Gpu;
pub use crate::input::InputState;
pub use crate::point_grid::PointGrid;
pub use crate::renderer::Renderer;
pub use crate::scene::Scene;
pub use crate::uniform_binding::UniformBinding;
pub use crate::uniform_buffer::UniformBuffer;
pub use crate::vertex::Vertex;

/// WGSL source for the point pipeline.
///
/// The vertex stage (`vertex_main`) transforms each point by `ubo.camera * ubo.model` and
/// passes its color through; the fragment stage (`fragment_main`) outputs that color. The
/// uniform block must match [`UniformBuffer`] and the vertex inputs must match
/// [`Vertex::vertex_attributes`].
pub const SHADER_SOURCE: &str = include_str!("shader_source.wgsl");

/// Browser entry point: sets up console logging and starts the viewer on the
/// `<canvas id="canvas">` element with the default configuration.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    run(ViewerConfig::default()).map_err(|err| JsValue::from_str(&err.to_string()))
}
