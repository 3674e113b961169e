//! # Application Core (`app.rs`)
//!
//! [`App`] is the `winit` application handler. It owns the window, the [`Renderer`], the
//! `egui` integration and the [`InputState`], and drives one update/render cycle per
//! redraw.
//!
//! ## Lifecycle
//!
//! - **`resumed`** creates the window from the [`ViewerConfig`], captures the mouse for
//!   first-person look, and initializes the renderer. On desktop the renderer is built
//!   synchronously with `pollster`; on WebAssembly it is built in a spawned future and
//!   handed back through a `oneshot` channel, then picked up by the next window event or
//!   `about_to_wait`, whichever comes first.
//! - **`window_event`** routes keyboard, wheel, focus and resize events, and on
//!   `RedrawRequested` runs the frame: measure the elapsed time, update the camera, lay
//!   out the overlay, render, and request the next redraw.
//! - **`device_event`** collects raw mouse motion, which keeps arriving while the cursor is
//!   locked and is therefore the right source for mouse look.
//!
//! ## Controls
//!
//! Movement keys are documented on [`CameraController`](crate::CameraController). The
//! application itself handles:
//!
//! - `Esc` quits,
//! - `Tab` toggles mouse capture (a click inside the window captures it as well),
//! - `F1` toggles the overlay.
//!
//! [`key_action`] decides which presses trigger these; auto-repeats never do.
//!
//! ## Errors
//!
//! A failure to create the window or the renderer, or a surface that runs out of memory,
//! stops the event loop. The error is stored and returned by [`run`].

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use std::sync::Arc;

use web_time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Theme, Window},
};

use crate::config::ViewerConfig;
use crate::hud::{self, FrameStats, HudData};
use crate::input::InputState;
use crate::renderer::Renderer;
use crate::ViewerError;

/// What a key press asks the application itself to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Exit,
    ToggleMouseLook,
    ToggleHud,
}

/// Maps a keyboard event to an application action.
///
/// Only fresh presses count; releases and auto-repeats return `None` so that holding `Tab`
/// or `F1` does not flicker the toggle.
pub fn key_action(key_code: KeyCode, state: ElementState, repeat: bool) -> Option<AppAction> {
    if state != ElementState::Pressed || repeat {
        return None;
    }
    match key_code {
        KeyCode::Escape => Some(AppAction::Exit),
        KeyCode::Tab => Some(AppAction::ToggleMouseLook),
        KeyCode::F1 => Some(AppAction::ToggleHud),
        _ => None,
    }
}

/// The `winit` application handler for the viewer.
pub struct App {
    /// Settings the window, grid and camera are created from.
    config: ViewerConfig,

    /// The window being rendered into. `None` until the first `resumed`.
    window: Option<Arc<Window>>,

    /// The renderer. `None` until initialization finished, which on WebAssembly may be a
    /// few events after the window exists.
    renderer: Option<Renderer>,

    /// `egui` integration with the window.
    gui_state: Option<egui_winit::State>,

    /// When the previous frame started, used to compute the frame delta.
    last_render_time: Option<Instant>,

    /// Receives the asynchronously created renderer on WebAssembly.
    #[cfg(target_arch = "wasm32")]
    renderer_receiver: Option<futures::channel::oneshot::Receiver<Result<Renderer, ViewerError>>>,

    /// Size of the window's drawable area in physical pixels.
    last_size: (u32, u32),

    /// Keys, mouse motion and scroll gathered between frames.
    input: InputState,

    /// Smoothed frame timing for the overlay.
    stats: FrameStats,

    /// Whether the cursor is captured and mouse motion turns the camera.
    mouse_look: bool,

    /// Whether the overlay is drawn.
    show_hud: bool,

    /// The error that stopped the event loop, if any.
    error: Option<ViewerError>,
}

impl App {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            show_hud: config.show_hud,
            last_size: (config.window_width, config.window_height),
            config,
            window: None,
            renderer: None,
            gui_state: None,
            last_render_time: None,
            #[cfg(target_arch = "wasm32")]
            renderer_receiver: None,
            input: InputState::new(),
            stats: FrameStats::default(),
            mouse_look: false,
            error: None,
        }
    }

    /// Takes the error that ended the event loop, if there was one.
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    /// Whether the cursor is captured for mouse look.
    pub fn mouse_look(&self) -> bool {
        self.mouse_look
    }

    /// Whether the overlay is drawn.
    pub fn show_hud(&self) -> bool {
        self.show_hud
    }

    // Without a window there is no cursor to capture.
    fn set_mouse_look(&mut self, enabled: bool) {
        self.mouse_look = match self.window.as_ref() {
            Some(window) => grab_cursor(window, enabled),
            None => false,
        };
    }

    /// Applies `action`. Returns `true` when the application should exit.
    fn apply_action(&mut self, action: AppAction) -> bool {
        match action {
            AppAction::Exit => return true,
            AppAction::ToggleMouseLook => self.set_mouse_look(!self.mouse_look),
            AppAction::ToggleHud => self.show_hud = !self.show_hud,
        }
        false
    }

    /// Forgets held keys and releases the cursor. Key releases that happen while the
    /// window is unfocused are never delivered.
    fn focus_lost(&mut self) {
        self.input.release_all();
        self.set_mouse_look(false);
    }

    /// Picks up the renderer built by the spawned future once it is ready.
    #[cfg(target_arch = "wasm32")]
    fn poll_renderer(&mut self, event_loop: &ActiveEventLoop) {
        let Some(receiver) = self.renderer_receiver.as_mut() else {
            return;
        };
        let Ok(Some(result)) = receiver.try_recv() else {
            return;
        };
        self.renderer_receiver = None;
        match result {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                // Do not count the grid upload as the first frame's delta.
                self.last_render_time = Some(Instant::now());
                self.request_redraw();
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_attributes(&mut self) -> Option<winit::window::WindowAttributes> {
        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ))
            .with_resizable(self.config.resizable);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            let Some(canvas) = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id("canvas"))
                .and_then(|element| element.dyn_into::<wgpu::web_sys::HtmlCanvasElement>().ok())
            else {
                log::error!("No <canvas id=\"canvas\"> element found in the document");
                return None;
            };
            self.last_size = (canvas.width(), canvas.height());
            return Some(attributes.with_canvas(Some(canvas)));
        }

        #[cfg(not(target_arch = "wasm32"))]
        Some(attributes)
    }
}

/// Captures (`enabled`) or releases the cursor. Returns whether it ended up captured.
///
/// `Locked` is preferred; platforms that cannot lock the cursor (X11) fall back to
/// confining it to the window, which still delivers raw motion.
fn grab_cursor(window: &Window, enabled: bool) -> bool {
    let result = if enabled {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };

    match result {
        Ok(()) => {
            window.set_cursor_visible(!enabled);
            enabled
        }
        Err(err) => {
            log::warn!("Could not change cursor grab: {err}");
            window.set_cursor_visible(true);
            false
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let Some(attributes) = self.window_attributes() else {
            event_loop.exit();
            return;
        };

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(event_loop, err.into());
                return;
            }
        };
        self.window = Some(window.clone());

        let gui_context = egui::Context::default();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let inner_size = window.inner_size();
            self.last_size = (inner_size.width, inner_size.height);
        }

        #[cfg(target_arch = "wasm32")]
        {
            gui_context.set_pixels_per_point(window.scale_factor() as f32);
        }

        let viewport_id = gui_context.viewport_id();
        let gui_state = egui_winit::State::new(
            gui_context,
            viewport_id,
            &window,
            Some(window.scale_factor() as _),
            Some(Theme::Dark),
            None,
        );

        let (width, height) = self.last_size;

        #[cfg(not(target_arch = "wasm32"))]
        {
            let renderer =
                pollster::block_on(Renderer::new(window.clone(), width, height, &self.config));
            match renderer {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(err) => {
                    self.fail(event_loop, err);
                    return;
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let (sender, receiver) = futures::channel::oneshot::channel();
            self.renderer_receiver = Some(receiver);
            log::info!("Canvas dimensions: ({width} x {height})");
            let config = self.config.clone();
            let window = window.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let renderer = Renderer::new(window, width, height, &config).await;
                if sender.send(renderer).is_err() {
                    log::error!("Failed to send renderer!");
                }
            });
        }

        self.gui_state = Some(gui_state);
        self.last_render_time = Some(Instant::now());

        // Browsers only grant pointer lock in response to a user gesture, so the web build
        // waits for a click instead.
        #[cfg(not(target_arch = "wasm32"))]
        self.set_mouse_look(true);

        window.request_redraw();
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.mouse_look {
                self.input.handle_mouse_motion(dx, dy);
            }
        }
    }

    // The renderer may arrive while no window event is pending, e.g. after the first
    // redraw already found it missing.
    #[cfg(target_arch = "wasm32")]
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_renderer(event_loop);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        {
            self.poll_renderer(event_loop);
            if self.error.is_some() {
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                self.input.handle_key(key_code, state);
                if let Some(action) = key_action(key_code, state, repeat) {
                    if self.apply_action(action) {
                        event_loop.exit();
                        return;
                    }
                }
                self.request_redraw();
                return;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !self.mouse_look => {
                self.set_mouse_look(true);
                self.request_redraw();
                return;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.input.handle_scroll(delta);
                self.request_redraw();
                return;
            }
            WindowEvent::Focused(false) => self.focus_lost(),
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting...");
                event_loop.exit();
                return;
            }
            _ => (),
        }

        let (Some(gui_state), Some(renderer), Some(window), Some(last_render_time)) = (
            self.gui_state.as_mut(),
            self.renderer.as_mut(),
            self.window.as_ref(),
            self.last_render_time.as_mut(),
        ) else {
            return;
        };

        if gui_state.on_window_event(window, &event).consumed {
            window.request_redraw();
            return;
        }

        match event {
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if renderer.resize(width, height) {
                    log::info!("Resized renderer surface to: ({width}, {height})");
                    self.last_size = (width, height);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = now - *last_render_time;
                *last_render_time = now;
                self.stats.record(delta_time.as_secs_f32());

                renderer.update(&mut self.input, delta_time, self.mouse_look);

                let gui_input = gui_state.take_egui_input(window);
                gui_state.egui_ctx().begin_pass(gui_input);

                if self.show_hud {
                    let scene = renderer.scene();
                    hud::show(
                        gui_state.egui_ctx(),
                        &HudData {
                            stats: &self.stats,
                            camera: &scene.camera,
                            point_count: scene.point_count(),
                            mouse_look: self.mouse_look,
                        },
                    );
                }

                let egui_winit::egui::FullOutput {
                    textures_delta,
                    shapes,
                    pixels_per_point,
                    platform_output,
                    ..
                } = gui_state.egui_ctx().end_pass();

                gui_state.handle_platform_output(window, platform_output);

                let paint_jobs = gui_state.egui_ctx().tessellate(shapes, pixels_per_point);

                let screen_descriptor = {
                    let (width, height) = self.last_size;
                    egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [width, height],
                        pixels_per_point: window.scale_factor() as f32,
                    }
                };

                if let Err(err) = renderer.render_frame(screen_descriptor, paint_jobs, textures_delta)
                {
                    self.fail(event_loop, err);
                    return;
                }
            }
            _ => (),
        }

        window.request_redraw();
    }
}

impl App {
    fn request_redraw(&self) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

/// Validates `config`, opens the viewer window and runs until it is closed.
///
/// On WebAssembly the event loop is handed to the browser and this returns immediately.
pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut app = App::new(config);
        event_loop.run_app(&mut app)?;
        match app.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;

        event_loop.spawn_app(App::new(config));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_keys_map_to_actions() {
        let press = |key| key_action(key, ElementState::Pressed, false);
        assert_eq!(press(KeyCode::Escape), Some(AppAction::Exit));
        assert_eq!(press(KeyCode::Tab), Some(AppAction::ToggleMouseLook));
        assert_eq!(press(KeyCode::F1), Some(AppAction::ToggleHud));
        assert_eq!(press(KeyCode::KeyW), None);
    }

    #[test]
    fn releases_and_repeats_trigger_nothing() {
        for key in [KeyCode::Escape, KeyCode::Tab, KeyCode::F1] {
            assert_eq!(key_action(key, ElementState::Released, false), None);
            assert_eq!(key_action(key, ElementState::Pressed, true), None);
        }
    }

    #[test]
    fn f1_toggles_overlay_and_escape_requests_exit() {
        let mut app = App::new(ViewerConfig::default());
        assert!(app.show_hud());

        assert!(!app.apply_action(AppAction::ToggleHud));
        assert!(!app.show_hud());
        assert!(!app.apply_action(AppAction::ToggleHud));
        assert!(app.show_hud());

        assert!(app.apply_action(AppAction::Exit));
    }

    #[test]
    fn hud_starts_hidden_when_configured() {
        let app = App::new(ViewerConfig {
            show_hud: false,
            ..ViewerConfig::default()
        });
        assert!(!app.show_hud());
    }

    #[test]
    fn mouse_look_cannot_be_captured_without_window() {
        let mut app = App::new(ViewerConfig::default());
        assert!(!app.apply_action(AppAction::ToggleMouseLook));
        assert!(!app.mouse_look());
    }

    #[test]
    fn focus_loss_releases_keys_and_mouse_look() {
        let mut app = App::new(ViewerConfig::default());
        app.mouse_look = true;
        app.input.handle_key(KeyCode::KeyW, ElementState::Pressed);
        app.input.handle_key(KeyCode::ShiftLeft, ElementState::Pressed);

        app.focus_lost();

        assert!(!app.mouse_look());
        assert!(!app.input.is_held(KeyCode::KeyW));
        assert!(!app.input.is_boosting());
    }
}
