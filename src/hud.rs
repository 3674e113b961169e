//! # Heads-Up Display (`hud.rs`)
//!
//! A small, read-only `egui` window in the top-left corner showing the frame rate, the
//! number of points drawn and the camera state, plus a reminder of the controls. It is
//! purely informational: it never takes focus, so it does not interfere with mouse look.

use crate::camera::Camera;

/// Weight of the newest sample in the smoothed frame time.
const SMOOTHING: f32 = 0.05;

/// Exponentially smoothed frame timing.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameStats {
    smoothed_frame_time: Option<f32>,
}

impl FrameStats {
    /// Records the duration of one frame in seconds. Non-positive samples are ignored.
    pub fn record(&mut self, seconds: f32) {
        if !(seconds > 0.0) {
            return;
        }
        self.smoothed_frame_time = Some(match self.smoothed_frame_time {
            Some(previous) => previous + SMOOTHING * (seconds - previous),
            None => seconds,
        });
    }

    /// Smoothed frame time in milliseconds.
    pub fn frame_time_ms(&self) -> f32 {
        self.smoothed_frame_time.unwrap_or(0.0) * 1000.0
    }

    /// Smoothed frames per second, zero before the first sample.
    pub fn fps(&self) -> f32 {
        self.smoothed_frame_time.map_or(0.0, |t| 1.0 / t)
    }
}

/// What the overlay displays for one frame.
pub struct HudData<'a> {
    pub stats: &'a FrameStats,
    pub camera: &'a Camera,
    pub point_count: u32,
    pub mouse_look: bool,
}

/// Lays out the overlay into `ctx`.
pub fn show(ctx: &egui::Context, data: &HudData<'_>) {
    let position = data.camera.position();
    egui::Window::new("points")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(8.0, 8.0))
        .resizable(false)
        .collapsible(false)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(format!(
                "{:.0} fps ({:.2} ms)",
                data.stats.fps(),
                data.stats.frame_time_ms()
            ));
            ui.label(format!("{} points", data.point_count));
            ui.separator();
            ui.label(format!(
                "position ({:.2}, {:.2}, {:.2})",
                position.x, position.y, position.z
            ));
            ui.label(format!(
                "yaw {:.1}°  pitch {:.1}°",
                data.camera.horizontal_angle(),
                data.camera.vertical_angle()
            ));
            ui.label(format!("fov {:.1}°", data.camera.field_of_view()));
            ui.separator();
            ui.small("WASD move · Z/X down/up · Shift boost");
            ui.small("wheel zoom · F1 hide · Esc quit");
            if data.mouse_look {
                ui.small("Tab release mouse");
            } else {
                ui.small("Tab capture mouse");
            }
        });
}
