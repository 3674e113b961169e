//! # Camera Controller (`controller.rs`)
//!
//! Turns one frame's worth of [`InputState`] into camera motion:
//!
//! | input          | effect                                   |
//! |----------------|------------------------------------------|
//! | `W` / `S`      | move along the view direction            |
//! | `A` / `D`      | strafe along the camera's right vector   |
//! | `X` / `Z`      | rise / sink along world `+Y`             |
//! | Shift          | multiply speed by the boost factor       |
//! | mouse motion   | turn (X) and tilt (Y)                    |
//! | mouse wheel    | zoom by changing the field of view       |
//!
//! Opposing keys do not cancel: when both are held, `S`, `A` and `Z` win.

use nalgebra_glm as glm;
use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::input::InputState;

/// Movement and look tunables applied by [`CameraController::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    /// Units per second.
    pub move_speed: f32,
    /// Speed factor while Shift is held.
    pub boost_multiplier: f32,
    /// Degrees per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Degrees of field of view per scrolled line.
    pub zoom_sensitivity: f32,
    pub min_field_of_view: f32,
    pub max_field_of_view: f32,
}

impl CameraController {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            boost_multiplier: config.boost_multiplier,
            mouse_sensitivity: config.mouse_sensitivity,
            zoom_sensitivity: config.zoom_sensitivity,
            min_field_of_view: config.min_field_of_view,
            max_field_of_view: config.max_field_of_view,
        }
    }

    /// Applies the input gathered since the previous frame to `camera`.
    ///
    /// Mouse motion only turns the camera when `mouse_look` is set, but the accumulated
    /// motion and scroll are drained either way so nothing piles up while the cursor is free.
    pub fn update(
        &self,
        camera: &mut Camera,
        input: &mut InputState,
        seconds_elapsed: f32,
        mouse_look: bool,
    ) {
        let speed = if input.is_boosting() {
            self.move_speed * self.boost_multiplier
        } else {
            self.move_speed
        };
        let step = seconds_elapsed * speed;

        if input.is_held(KeyCode::KeyS) {
            camera.offset_position(-camera.forward() * step);
        } else if input.is_held(KeyCode::KeyW) {
            camera.offset_position(camera.forward() * step);
        }

        if input.is_held(KeyCode::KeyA) {
            camera.offset_position(-camera.right() * step);
        } else if input.is_held(KeyCode::KeyD) {
            camera.offset_position(camera.right() * step);
        }

        let world_up = glm::vec3(0.0, 1.0, 0.0);
        if input.is_held(KeyCode::KeyZ) {
            camera.offset_position(-world_up * step);
        } else if input.is_held(KeyCode::KeyX) {
            camera.offset_position(world_up * step);
        }

        let (dx, dy) = input.take_mouse_delta();
        if mouse_look {
            camera.offset_orientation(
                self.mouse_sensitivity * dy as f32,
                self.mouse_sensitivity * dx as f32,
            );
        }

        let scroll = input.take_scroll();
        if scroll != 0.0 {
            let field_of_view = (camera.field_of_view() + self.zoom_sensitivity * scroll as f32)
                .clamp(self.min_field_of_view, self.max_field_of_view);
            if let Err(err) = camera.set_field_of_view(field_of_view) {
                log::warn!("Ignoring zoom: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::{ElementState, MouseScrollDelta};

    fn controller() -> CameraController {
        CameraController::from_config(&ViewerConfig::default())
    }

    fn press(input: &mut InputState, keys: &[KeyCode]) {
        for key in keys {
            input.handle_key(*key, ElementState::Pressed);
        }
    }

    fn assert_near(actual: glm::Vec3, expected: glm::Vec3) {
        assert!(
            glm::length(&(actual - expected)) < 1e-4,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn forward_moves_along_view_direction() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        press(&mut input, &[KeyCode::KeyW]);

        let start = camera.position();
        controller().update(&mut camera, &mut input, 0.5, true);
        assert_near(camera.position(), start + glm::vec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn backward_wins_over_forward() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        press(&mut input, &[KeyCode::KeyW, KeyCode::KeyS]);

        let start = camera.position();
        controller().update(&mut camera, &mut input, 1.0, true);
        assert_near(camera.position(), start + glm::vec3(0.0, 0.0, 2.0));
    }

    #[test]
    fn strafe_and_vertical_movement_combine() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        press(&mut input, &[KeyCode::KeyD, KeyCode::KeyX]);

        let start = camera.position();
        controller().update(&mut camera, &mut input, 1.0, true);
        assert_near(camera.position(), start + glm::vec3(2.0, 2.0, 0.0));
    }

    #[test]
    fn vertical_movement_ignores_pitch() {
        let mut camera = Camera::default();
        camera.offset_orientation(45.0, 0.0);
        let mut input = InputState::new();
        press(&mut input, &[KeyCode::KeyZ]);

        let start = camera.position();
        controller().update(&mut camera, &mut input, 1.0, true);
        assert_near(camera.position(), start + glm::vec3(0.0, -2.0, 0.0));
    }

    #[test]
    fn shift_boosts_speed() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        press(&mut input, &[KeyCode::KeyW, KeyCode::ShiftLeft]);

        let start = camera.position();
        controller().update(&mut camera, &mut input, 1.0, true);
        assert_near(camera.position(), start + glm::vec3(0.0, 0.0, -10.0));
    }

    #[test]
    fn mouse_motion_turns_camera_and_is_drained() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.handle_mouse_motion(100.0, 50.0);

        controller().update(&mut camera, &mut input, 0.016, true);
        assert!((camera.horizontal_angle() - 10.0).abs() < 1e-4);
        assert!((camera.vertical_angle() - 5.0).abs() < 1e-4);

        controller().update(&mut camera, &mut input, 0.016, true);
        assert!((camera.horizontal_angle() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn mouse_motion_is_discarded_without_mouse_look() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.handle_mouse_motion(100.0, 50.0);

        controller().update(&mut camera, &mut input, 0.016, false);
        assert_eq!(camera.horizontal_angle(), 0.0);
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn scrolling_up_zooms_in_within_bounds() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.handle_scroll(MouseScrollDelta::LineDelta(0.0, 10.0));

        controller().update(&mut camera, &mut input, 0.016, true);
        assert!((camera.field_of_view() - 48.0).abs() < 1e-4);

        input.handle_scroll(MouseScrollDelta::LineDelta(0.0, 1000.0));
        controller().update(&mut camera, &mut input, 0.016, true);
        assert_eq!(camera.field_of_view(), 5.0);

        input.handle_scroll(MouseScrollDelta::LineDelta(0.0, -10_000.0));
        controller().update(&mut camera, &mut input, 0.016, true);
        assert_eq!(camera.field_of_view(), 130.0);
    }
}
