//! # Viewer Configuration (`config.rs`)
//!
//! [`ViewerConfig`] gathers every tunable of the viewer in one place: the window, the
//! generated grid, the initial camera and the input sensitivities. `Default` yields the
//! classic setup of a 256 x 256 x 256 grid seen from four units in front of its center
//! through an 800 x 600 window.
//!
//! The desktop binary fills this struct from the command line; the wasm entry point uses
//! the defaults. Either way [`ViewerConfig::validate`] runs before any GPU work starts so
//! that a bad value fails fast with a readable message instead of a device error.

use crate::point_grid::PointGrid;
use crate::ViewerError;

/// All tunables of the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Initial inner width of the window in physical pixels.
    pub window_width: u32,
    /// Initial inner height of the window in physical pixels.
    pub window_height: u32,
    /// Window title.
    pub title: String,
    /// Whether the window may be resized by the user.
    pub resizable: bool,

    /// Number of points along the X axis.
    pub grid_width: u32,
    /// Number of points along the Y axis.
    pub grid_height: u32,
    /// Number of points along the Z axis.
    pub grid_depth: u32,

    /// Where the camera starts.
    pub camera_position: [f32; 3],
    /// Initial vertical field of view in degrees.
    pub field_of_view: f32,
    /// Distance to the near clip plane.
    pub near_plane: f32,
    /// Distance to the far clip plane.
    pub far_plane: f32,

    /// Camera translation speed in units per second.
    pub move_speed: f32,
    /// Speed factor applied while Shift is held.
    pub boost_multiplier: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Degrees of field of view per scrolled line. Negative means scrolling up zooms in.
    pub zoom_sensitivity: f32,
    /// Lower bound for zooming.
    pub min_field_of_view: f32,
    /// Upper bound for zooming.
    pub max_field_of_view: f32,

    /// Rotation of the grid around +Y in degrees per second. Zero keeps it still.
    pub spin_degrees_per_second: f32,
    /// Whether the overlay starts visible.
    pub show_hud: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            title: "points".to_owned(),
            resizable: false,
            grid_width: 256,
            grid_height: 256,
            grid_depth: 256,
            camera_position: [0.0, 0.0, 4.0],
            field_of_view: 50.0,
            near_plane: 0.01,
            far_plane: 100.0,
            move_speed: 2.0,
            boost_multiplier: 5.0,
            mouse_sensitivity: 0.1,
            zoom_sensitivity: -0.2,
            min_field_of_view: 5.0,
            max_field_of_view: 130.0,
            spin_degrees_per_second: 0.0,
            show_hud: true,
        }
    }
}

impl ViewerConfig {
    /// Aspect ratio of the initial window.
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    /// Checks that every value can be used to build a window, a grid and a camera.
    pub fn validate(&self) -> Result<(), ViewerError> {
        fn invalid(message: impl Into<String>) -> Result<(), ViewerError> {
            Err(ViewerError::InvalidConfig(message.into()))
        }

        if self.window_width == 0 || self.window_height == 0 {
            return invalid(format!(
                "window size {}x{} must be non-zero",
                self.window_width, self.window_height
            ));
        }

        PointGrid::new(self.grid_width, self.grid_height, self.grid_depth)?;

        if !(self.near_plane > 0.0) || !(self.far_plane > self.near_plane) {
            return invalid(format!(
                "clip planes near={} far={} must satisfy 0 < near < far",
                self.near_plane, self.far_plane
            ));
        }

        let fov_in_range = |fov: f32| fov > 0.0 && fov < 180.0;
        if !fov_in_range(self.min_field_of_view)
            || !fov_in_range(self.max_field_of_view)
            || self.min_field_of_view > self.max_field_of_view
        {
            return invalid(format!(
                "zoom range [{}, {}] must lie within (0, 180)",
                self.min_field_of_view, self.max_field_of_view
            ));
        }

        if !(self.min_field_of_view..=self.max_field_of_view).contains(&self.field_of_view) {
            return invalid(format!(
                "field of view {} outside zoom range [{}, {}]",
                self.field_of_view, self.min_field_of_view, self.max_field_of_view
            ));
        }

        let rates = [
            ("move speed", self.move_speed),
            ("boost multiplier", self.boost_multiplier),
            ("mouse sensitivity", self.mouse_sensitivity),
            ("zoom sensitivity", self.zoom_sensitivity),
            ("spin", self.spin_degrees_per_second),
        ];
        if let Some((name, value)) = rates.iter().find(|(_, value)| !value.is_finite()) {
            return invalid(format!("{name} must be finite, got {value}"));
        }

        if self.camera_position.iter().any(|c| !c.is_finite()) {
            return invalid(format!(
                "camera position {:?} must be finite",
                self.camera_position
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.title, "points");
        assert!((config.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_empty_grid() {
        let config = ViewerConfig {
            grid_depth: 0,
            ..ViewerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ViewerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_grid_larger_than_u32() {
        let config = ViewerConfig {
            grid_width: 2048,
            grid_height: 2048,
            grid_depth: 2048,
            ..ViewerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let config = ViewerConfig {
            near_plane: 10.0,
            far_plane: 1.0,
            ..ViewerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ViewerConfig {
            near_plane: 0.0,
            ..ViewerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_field_of_view_outside_zoom_range() {
        let config = ViewerConfig {
            field_of_view: 150.0,
            ..ViewerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ViewerConfig {
            min_field_of_view: 90.0,
            max_field_of_view: 45.0,
            field_of_view: 60.0,
            ..ViewerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_window_size() {
        let config = ViewerConfig {
            window_height: 0,
            ..ViewerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window size 800x0"));
    }

    #[test]
    fn rejects_non_finite_camera_position() {
        let config = ViewerConfig {
            camera_position: [0.0, f32::INFINITY, 4.0],
            ..ViewerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("camera position"));
    }

    #[test]
    fn rejects_non_finite_rates() {
        let config = ViewerConfig {
            mouse_sensitivity: f32::NAN,
            ..ViewerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mouse sensitivity"));
    }
}
