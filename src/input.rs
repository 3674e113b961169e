//! # Input State (`input.rs`)
//!
//! `winit` delivers keyboard, wheel and raw mouse events one at a time, whereas the camera
//! is updated once per frame. [`InputState`] sits in between: the application feeds it
//! every event as it arrives, and the per-frame update reads the held keys and drains the
//! accumulated mouse motion and scroll.
//!
//! Draining is what keeps mouse look relative: every frame starts from a zero delta, the
//! same way a cursor that is warped back to a fixed spot after each frame would.

use std::collections::HashSet;

use winit::event::{ElementState, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Pixel scroll deltas (touchpads) are converted to wheel lines at this rate.
pub const PIXELS_PER_SCROLL_LINE: f64 = 20.0;

/// Keyboard and mouse state accumulated between two frames.
#[derive(Debug, Default)]
pub struct InputState {
    held_keys: HashSet<KeyCode>,
    mouse_delta: (f64, f64),
    scroll_lines: f64,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key press or release.
    pub fn handle_key(&mut self, key_code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.held_keys.insert(key_code);
            }
            ElementState::Released => {
                self.held_keys.remove(&key_code);
            }
        }
    }

    /// Adds raw mouse motion in pixels.
    pub fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// Adds a wheel event. Positive values scroll up.
    pub fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll_lines += match delta {
            MouseScrollDelta::LineDelta(_, y) => f64::from(y),
            MouseScrollDelta::PixelDelta(position) => position.y / PIXELS_PER_SCROLL_LINE,
        };
    }

    pub fn is_held(&self, key_code: KeyCode) -> bool {
        self.held_keys.contains(&key_code)
    }

    /// `true` while either Shift key is down.
    pub fn is_boosting(&self) -> bool {
        self.is_held(KeyCode::ShiftLeft) || self.is_held(KeyCode::ShiftRight)
    }

    /// Returns the mouse motion accumulated since the last call and resets it.
    pub fn take_mouse_delta(&mut self) -> (f64, f64) {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Returns the scrolled lines accumulated since the last call and resets them.
    pub fn take_scroll(&mut self) -> f64 {
        std::mem::take(&mut self.scroll_lines)
    }

    /// Forgets held keys, e.g. when the window loses focus and release events would be lost.
    pub fn release_all(&mut self) {
        self.held_keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn tracks_held_keys() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::KeyW, ElementState::Pressed);
        input.handle_key(KeyCode::ShiftRight, ElementState::Pressed);
        assert!(input.is_held(KeyCode::KeyW));
        assert!(input.is_boosting());

        input.handle_key(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_held(KeyCode::KeyW));

        input.release_all();
        assert!(!input.is_boosting());
    }

    #[test]
    fn mouse_motion_accumulates_until_taken() {
        let mut input = InputState::new();
        input.handle_mouse_motion(3.0, -1.0);
        input.handle_mouse_motion(2.0, 4.0);
        assert_eq!(input.take_mouse_delta(), (5.0, 3.0));
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn scroll_converts_pixels_to_lines() {
        let mut input = InputState::new();
        input.handle_scroll(MouseScrollDelta::LineDelta(0.0, 2.0));
        input.handle_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(
            0.0,
            -PIXELS_PER_SCROLL_LINE,
        )));
        assert_eq!(input.take_scroll(), 1.0);
        assert_eq!(input.take_scroll(), 0.0);
    }
}
