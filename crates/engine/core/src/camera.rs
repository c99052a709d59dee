//! Perspective camera used to cast pointer rays into the scene
//!
//! # Coordinate System
//!
//! Uses OpenGL convention:
//! - +X is right
//! - +Y is up
//! - -Z is forward (into the screen)

use crate::projection::Ray;
use glam::{Mat3, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Default vertical field of view: 60 degrees
pub const DEFAULT_VFOV: f32 = 60.0 * std::f32::consts::PI / 180.0;

/// Default near clip distance
pub const DEFAULT_NEAR: f32 = 0.1;

/// Default far clip distance
pub const DEFAULT_FAR: f32 = 1000.0;

/// Camera for 3D rendering and pointer picking
///
/// # Examples
///
/// ```
/// use contour_core::camera::Camera;
/// use glam::Vec3;
///
/// let camera = Camera::look_at(Vec3::new(0.0, 5.0, 5.0), Vec3::ZERO, Vec3::Y);
/// assert!(camera.forward().y < 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Camera rotation (orientation) as quaternion
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub vfov: f32,
    /// Near clip plane distance
    pub near: f32,
    /// Far clip plane distance
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 6.0, 8.0), Vec3::ZERO, Vec3::Y)
    }
}

impl Camera {
    /// Create a new camera at the given position looking down -Z
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            vfov: DEFAULT_VFOV,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    /// Create camera with position looking at target
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let mut camera = Self::new(position);
        camera.rotation = look_rotation(position, target, up);
        camera
    }

    /// Builder-style vertical field of view override (radians)
    pub fn with_vfov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Get the forward direction vector
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Get the right direction vector
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction vector
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Zoom by moving camera forward/backward along view direction
    pub fn zoom(&mut self, delta: f32) {
        self.position += self.forward() * delta;
    }

    /// World → view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// View → clip transform for the given aspect ratio (width / height)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.vfov, aspect, self.near, self.far)
    }

    /// Cast a ray from the near plane through a normalized device coordinate
    ///
    /// `ndc` is in `[-1, 1]²` with +Y up.
    pub fn ray_through_ndc(&self, ndc: Vec2, aspect: f32) -> Ray {
        let clip_to_world = (self.projection_matrix(aspect) * self.view_matrix()).inverse();
        let near = clip_to_world.project_point3(ndc.extend(-1.0));
        let far = clip_to_world.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }
}

/// Below this, the view direction counts as parallel to `up`
const PARALLEL_EPSILON: f32 = 1e-6;

fn look_rotation(position: Vec3, target: Vec3, up: Vec3) -> Quat {
    let Some(forward) = (target - position).try_normalize() else {
        return Quat::IDENTITY;
    };

    let mut right = forward.cross(up);
    if right.length_squared() < PARALLEL_EPSILON {
        // Looking along `up`: screen up leans toward -Z when looking down
        right = forward.cross(Vec3::Z * forward.dot(up).signum());
    }
    if right.length_squared() < PARALLEL_EPSILON {
        right = forward.any_orthonormal_vector();
    }
    let right = right.normalize();
    let cam_up = right.cross(forward);

    // In camera space: right=+X, up=+Y, forward=-Z
    Quat::from_mat3(&Mat3::from_cols(right, cam_up, -forward))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_default() {
        let camera = Camera::default();
        assert!((camera.vfov - DEFAULT_VFOV).abs() < 0.001);
        // Looking down at the origin
        assert!(camera.forward().y < 0.0);
    }

    #[test]
    fn test_camera_look_at() {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);

        let forward = camera.forward();
        assert!((forward - Vec3::NEG_Z).length() < 0.001);
        assert!((camera.right() - Vec3::X).length() < 0.001);
    }

    #[test]
    fn test_straight_down_camera_is_well_formed() {
        let camera = Camera::look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, Vec3::Y);

        assert!(camera.rotation.is_finite());
        assert!((camera.forward() - Vec3::NEG_Y).length() < 1e-4);
        assert!((camera.right() - Vec3::X).length() < 1e-4);
        assert!((camera.up() - Vec3::NEG_Z).length() < 1e-4);

        let ray = camera.ray_through_ndc(Vec2::ZERO, 1.0);
        assert!(ray.direction.is_finite());
    }

    #[test]
    fn test_straight_up_and_coincident_cameras_stay_finite() {
        let up = Camera::look_at(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0), Vec3::Y);
        assert!(up.rotation.is_finite());
        assert!((up.forward() - Vec3::Y).length() < 1e-4);

        let coincident = Camera::look_at(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert_eq!(coincident.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_center_ray_follows_forward() {
        let camera = Camera::look_at(Vec3::new(1.0, 4.0, 3.0), Vec3::ZERO, Vec3::Y);
        let ray = camera.ray_through_ndc(Vec2::ZERO, 16.0 / 9.0);

        assert!((ray.direction - camera.forward()).length() < 1e-4);
        // Origin sits on the near plane in front of the camera
        assert!((ray.origin - camera.position).length() < camera.near * 1.5);
    }

    #[test]
    fn test_upper_ndc_ray_points_higher() {
        let camera = Camera::look_at(Vec3::new(0.0, 5.0, 5.0), Vec3::ZERO, Vec3::Y);
        let center = camera.ray_through_ndc(Vec2::ZERO, 1.0);
        let top = camera.ray_through_ndc(Vec2::new(0.0, 1.0), 1.0);
        assert!(top.direction.y > center.direction.y);
    }

    #[test]
    fn test_zoom_moves_along_forward() {
        let mut camera = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        camera.zoom(2.0);
        assert!((camera.position.z - 3.0).abs() < 1e-5);
    }
}
