//! # First-Person Camera (`camera.rs`)
//!
//! A free-flying camera described by a position and two angles:
//!
//! - the **horizontal angle** (yaw, degrees) turns the camera around the world Y axis and
//!   is kept in `[0, 360)`;
//! - the **vertical angle** (pitch, degrees) tilts it around its local X axis and is
//!   clamped to `±MAX_VERTICAL_ANGLE` so the view can never flip over the poles.
//!
//! At zero angles the camera looks down `-Z` with `+Y` up, the usual right-handed
//! convention. The view matrix is `orientation * translate(-position)` with
//! `orientation = Rx(vertical) * Ry(horizontal)`, and the projection maps depth into
//! the `[0, 1]` range `wgpu` expects.
//!
//! Positive vertical offsets tilt the view down and positive horizontal offsets turn it
//! to the right, which makes raw mouse deltas (Y grows downwards) usable as-is.

use nalgebra_glm as glm;

use crate::ViewerError;

/// Largest allowed pitch in degrees. Must stay below 90 to keep `look_at`-style math stable.
pub const MAX_VERTICAL_ANGLE: f32 = 85.0;

/// First-person camera with perspective projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: glm::Vec3,
    horizontal_angle: f32,
    vertical_angle: f32,
    field_of_view: f32,
    near_plane: f32,
    far_plane: f32,
    viewport_aspect_ratio: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: glm::vec3(0.0, 0.0, 1.0),
            horizontal_angle: 0.0,
            vertical_angle: 0.0,
            field_of_view: 50.0,
            near_plane: 0.01,
            far_plane: 100.0,
            viewport_aspect_ratio: 4.0 / 3.0,
        }
    }
}

impl Camera {
    /// World-space position of the eye.
    pub fn position(&self) -> glm::Vec3 {
        self.position
    }

    /// Moves the eye to `position` without changing where it looks.
    pub fn set_position(&mut self, position: glm::Vec3) {
        self.position = position;
    }

    /// Moves the eye by `offset` in world space.
    pub fn offset_position(&mut self, offset: glm::Vec3) {
        self.position += offset;
    }

    /// Yaw in degrees, within `[0, 360)`.
    pub fn horizontal_angle(&self) -> f32 {
        self.horizontal_angle
    }

    /// Pitch in degrees, within `±MAX_VERTICAL_ANGLE`.
    pub fn vertical_angle(&self) -> f32 {
        self.vertical_angle
    }

    /// Vertical field of view in degrees.
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Sets the vertical field of view in degrees.
    ///
    /// # Errors
    ///
    /// [`ViewerError::InvalidCamera`] if `field_of_view` is not within `(0, 180)`. The
    /// camera is left unchanged.
    pub fn set_field_of_view(&mut self, field_of_view: f32) -> Result<(), ViewerError> {
        if !(field_of_view > 0.0 && field_of_view < 180.0) {
            return Err(ViewerError::InvalidCamera(format!(
                "field of view {field_of_view} outside (0, 180)"
            )));
        }
        self.field_of_view = field_of_view;
        Ok(())
    }

    /// Distance to the near clip plane.
    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    /// Distance to the far clip plane.
    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    /// Sets both clip planes. Requires `0 < near < far`.
    pub fn set_near_and_far_planes(&mut self, near: f32, far: f32) -> Result<(), ViewerError> {
        if !(near > 0.0 && far > near) {
            return Err(ViewerError::InvalidCamera(format!(
                "clip planes near={near} far={far} must satisfy 0 < near < far"
            )));
        }
        self.near_plane = near;
        self.far_plane = far;
        Ok(())
    }

    /// Width / height of the viewport the projection is built for.
    pub fn viewport_aspect_ratio(&self) -> f32 {
        self.viewport_aspect_ratio
    }

    /// Sets the width / height ratio of the viewport. Must be positive.
    pub fn set_viewport_aspect_ratio(&mut self, aspect_ratio: f32) -> Result<(), ViewerError> {
        if !(aspect_ratio > 0.0 && aspect_ratio.is_finite()) {
            return Err(ViewerError::InvalidCamera(format!(
                "aspect ratio {aspect_ratio} must be positive"
            )));
        }
        self.viewport_aspect_ratio = aspect_ratio;
        Ok(())
    }

    /// Rotation part of the view transform, without translation.
    pub fn orientation(&self) -> glm::Mat4 {
        let orientation = glm::rotate(
            &glm::Mat4::identity(),
            self.vertical_angle.to_radians(),
            &glm::vec3(1.0, 0.0, 0.0),
        );
        glm::rotate(
            &orientation,
            self.horizontal_angle.to_radians(),
            &glm::vec3(0.0, 1.0, 0.0),
        )
    }

    /// Tilts the camera by `up_degrees` and turns it by `right_degrees`.
    pub fn offset_orientation(&mut self, up_degrees: f32, right_degrees: f32) {
        self.horizontal_angle += right_degrees;
        self.vertical_angle += up_degrees;
        self.normalize_angles();
    }

    /// Points the camera at `target`. Does nothing if `target` is the camera position.
    pub fn look_at(&mut self, target: glm::Vec3) {
        let offset = target - self.position;
        if glm::length(&offset) <= f32::EPSILON {
            return;
        }
        let direction = glm::normalize(&offset);
        self.vertical_angle = (-direction.y).asin().to_degrees();
        self.horizontal_angle = -(-direction.x).atan2(-direction.z).to_degrees();
        self.normalize_angles();
    }

    /// Unit vector the camera is looking along.
    pub fn forward(&self) -> glm::Vec3 {
        self.to_world(glm::vec4(0.0, 0.0, -1.0, 1.0))
    }

    /// Unit vector pointing to the right of the view.
    pub fn right(&self) -> glm::Vec3 {
        self.to_world(glm::vec4(1.0, 0.0, 0.0, 1.0))
    }

    /// Unit vector pointing up in view space.
    pub fn up(&self) -> glm::Vec3 {
        self.to_world(glm::vec4(0.0, 1.0, 0.0, 1.0))
    }

    /// Perspective projection with depth mapped to `[0, 1]`.
    pub fn projection(&self) -> glm::Mat4 {
        glm::perspective_rh_zo(
            self.viewport_aspect_ratio,
            self.field_of_view.to_radians(),
            self.near_plane,
            self.far_plane,
        )
    }

    /// World-to-view transform: translate by `-position`, then rotate by the orientation.
    pub fn view(&self) -> glm::Mat4 {
        self.orientation() * glm::translate(&glm::Mat4::identity(), &(-self.position))
    }

    /// Combined `projection * view` matrix uploaded to the shader.
    pub fn matrix(&self) -> glm::Mat4 {
        self.projection() * self.view()
    }

    // The orientation is a pure rotation, so its transpose is its inverse.
    fn to_world(&self, direction: glm::Vec4) -> glm::Vec3 {
        let world = glm::transpose(&self.orientation()) * direction;
        glm::vec3(world.x, world.y, world.z)
    }

    fn normalize_angles(&mut self) {
        self.horizontal_angle = self.horizontal_angle.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if self.horizontal_angle >= 360.0 {
            self.horizontal_angle = 0.0;
        }
        self.vertical_angle = self
            .vertical_angle
            .clamp(-MAX_VERTICAL_ANGLE, MAX_VERTICAL_ANGLE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_vec_eq(actual: glm::Vec3, expected: glm::Vec3) {
        assert!(
            glm::length(&(actual - expected)) < EPSILON,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn default_looks_down_negative_z() {
        let camera = Camera::default();
        assert_vec_eq(camera.forward(), glm::vec3(0.0, 0.0, -1.0));
        assert_vec_eq(camera.right(), glm::vec3(1.0, 0.0, 0.0));
        assert_vec_eq(camera.up(), glm::vec3(0.0, 1.0, 0.0));
    }

    #[test]
    fn turning_right_looks_along_positive_x() {
        let mut camera = Camera::default();
        camera.offset_orientation(0.0, 90.0);
        assert_vec_eq(camera.forward(), glm::vec3(1.0, 0.0, 0.0));
        assert_vec_eq(camera.right(), glm::vec3(0.0, 0.0, 1.0));
    }

    #[test]
    fn positive_vertical_offset_looks_down() {
        let mut camera = Camera::default();
        camera.offset_orientation(30.0, 0.0);
        let forward = camera.forward();
        assert!(forward.y < 0.0);
        assert!((forward.y + 30_f32.to_radians().sin()).abs() < EPSILON);
    }

    #[test]
    fn horizontal_angle_wraps() {
        let mut camera = Camera::default();
        camera.offset_orientation(0.0, 370.0);
        assert!((camera.horizontal_angle() - 10.0).abs() < 1e-3);

        camera.offset_orientation(0.0, -20.0);
        assert!((camera.horizontal_angle() - 350.0).abs() < 1e-3);
    }

    #[test]
    fn vertical_angle_is_clamped() {
        let mut camera = Camera::default();
        camera.offset_orientation(200.0, 0.0);
        assert_eq!(camera.vertical_angle(), MAX_VERTICAL_ANGLE);

        camera.offset_orientation(-500.0, 0.0);
        assert_eq!(camera.vertical_angle(), -MAX_VERTICAL_ANGLE);
    }

    #[test]
    fn view_moves_world_opposite_to_camera() {
        let mut camera = Camera::default();
        camera.set_position(glm::vec3(0.0, 0.0, 4.0));
        let origin = camera.view() * glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert!((origin.z + 4.0).abs() < EPSILON);
        assert!(origin.x.abs() < EPSILON && origin.y.abs() < EPSILON);
    }

    #[test]
    fn projection_maps_clip_planes_to_unit_depth() {
        let mut camera = Camera::default();
        camera.set_position(glm::vec3(0.0, 0.0, 0.0));
        camera.set_near_and_far_planes(1.0, 10.0).unwrap();

        let near = camera.matrix() * glm::vec4(0.0, 0.0, -1.0, 1.0);
        let far = camera.matrix() * glm::vec4(0.0, 0.0, -10.0, 1.0);
        assert!((near.z / near.w).abs() < EPSILON);
        assert!((far.z / far.w - 1.0).abs() < EPSILON);
    }

    #[test]
    fn look_at_aims_forward_at_target() {
        let mut camera = Camera::default();
        camera.set_position(glm::vec3(1.0, 2.0, 3.0));
        let target = glm::vec3(4.0, 0.0, -2.0);
        camera.look_at(target);
        assert_vec_eq(
            camera.forward(),
            glm::normalize(&(target - camera.position())),
        );
    }

    #[test]
    fn look_at_own_position_is_ignored() {
        let mut camera = Camera::default();
        camera.offset_orientation(10.0, 20.0);
        let before = camera.clone();
        camera.look_at(camera.position());
        assert_eq!(camera, before);
    }

    #[test]
    fn setters_reject_degenerate_values() {
        let mut camera = Camera::default();
        assert!(camera.set_field_of_view(0.0).is_err());
        assert!(camera.set_field_of_view(180.0).is_err());
        assert!(camera.set_near_and_far_planes(0.0, 10.0).is_err());
        assert!(camera.set_near_and_far_planes(5.0, 5.0).is_err());
        assert!(camera.set_viewport_aspect_ratio(0.0).is_err());
        assert_eq!(camera, Camera::default());

        camera.set_field_of_view(90.0).unwrap();
        assert_eq!(camera.field_of_view(), 90.0);
    }
}
