//! Screen → world → surface projection
//!
//! A pointer pixel is turned into normalized device coordinates, cast as a
//! ray from the camera, intersected with a reference plane and finally
//! expressed in the terrain mesh's local `[0, 1]²` surface coordinates.
//!
//! Every miss (empty viewport, pointer outside, ray parallel to or pointing
//! away from the plane) yields `None` and leaves the projector untouched.

use crate::camera::Camera;
use crate::input::Viewport;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Minimum movement (world units) before a new position is emitted
pub const DEFAULT_MOVE_THRESHOLD: f32 = 0.02;

/// Rays closer to parallel than this never hit the plane
const PARALLEL_EPSILON: f32 = 1e-6;

// ============================================================================
// Ray / Plane
// ============================================================================

/// Half-line with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Infinite plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Horizontal plane at height `y`
    pub fn horizontal(y: f32) -> Self {
        Self::new(Vec3::new(0.0, y, 0.0), Vec3::Y)
    }

    /// Intersect a ray with the plane
    ///
    /// Returns `None` when the ray is parallel to the plane or the hit lies
    /// behind the ray origin.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.point - ray.origin).dot(self.normal) / denom;
        if !t.is_finite() || t < 0.0 {
            return None;
        }

        Some(ray.at(t))
    }
}

// ============================================================================
// Surface frame
// ============================================================================

/// Local frame of the deformable terrain mesh
///
/// The mesh spans `size.x` along local X and `size.y` along local Z,
/// centered on the local origin, with displacement along local +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    pub world_from_local: Mat4,
    pub size: Vec2,
}

impl Default for SurfaceFrame {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec2::splat(10.0))
    }
}

impl SurfaceFrame {
    /// Axis-aligned mesh centered at `origin`
    pub fn new(origin: Vec3, size: Vec2) -> Self {
        Self::with_transform(Mat4::from_translation(origin), size)
    }

    pub fn with_transform(world_from_local: Mat4, size: Vec2) -> Self {
        Self {
            world_from_local,
            size,
        }
    }

    /// Mesh origin in world space
    pub fn origin(&self) -> Vec3 {
        self.world_from_local.transform_point3(Vec3::ZERO)
    }

    /// Mesh displacement direction in world space
    pub fn up(&self) -> Vec3 {
        self.world_from_local
            .transform_vector3(Vec3::Y)
            .normalize_or_zero()
    }

    /// Default picking plane: horizontal through the mesh origin
    pub fn reference_plane(&self) -> Plane {
        Plane::new(self.origin(), Vec3::Y)
    }

    /// Express a world point as a surface coordinate, clamped to `[0, 1]²`
    pub fn to_surface(&self, world: Vec3) -> Vec2 {
        let local = self.world_from_local.inverse().transform_point3(world);
        let uv = Vec2::new(local.x / self.size.x + 0.5, local.z / self.size.y + 0.5);
        if uv.is_finite() {
            uv.clamp(Vec2::ZERO, Vec2::ONE)
        } else {
            Vec2::splat(0.5)
        }
    }

    /// World position of a surface coordinate displaced by `height`
    pub fn to_world(&self, uv: Vec2, height: f32) -> Vec3 {
        let local = Vec3::new(
            (uv.x - 0.5) * self.size.x,
            height,
            (uv.y - 0.5) * self.size.y,
        );
        self.world_from_local.transform_point3(local)
    }
}

// ============================================================================
// Throttle
// ============================================================================

/// Distance-based emit filter
///
/// Bounds the outbound message rate without a timer: a point is admitted
/// only if it moved more than `threshold` since the last admitted point.
#[derive(Debug, Clone, Copy)]
pub struct MovementThrottle {
    threshold: f32,
    last: Option<Vec3>,
}

impl MovementThrottle {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            last: None,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Admit `point` if it cleared the threshold, remembering it
    pub fn admit(&mut self, point: Vec3) -> bool {
        match self.last {
            Some(last) if last.distance(point) <= self.threshold => false,
            _ => {
                self.last = Some(point);
                true
            }
        }
    }

    /// Forget the last admitted point so the next one always passes
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for MovementThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_THRESHOLD)
    }
}

// ============================================================================
// Projector
// ============================================================================

/// What a projected pointer position is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Terrain surface coordinates via camera ray and reference plane
    #[default]
    Surface,
    /// Plain `[0, 1]²` viewport fractions (flat page layout)
    Screen,
}

/// Projects pointer pixels onto the terrain surface
#[derive(Debug, Clone)]
pub struct Projector {
    camera: Camera,
    frame: SurfaceFrame,
    plane: Plane,
    mode: ProjectionMode,
    throttle: MovementThrottle,
}

impl Projector {
    pub fn new(camera: Camera, frame: SurfaceFrame, mode: ProjectionMode, threshold: f32) -> Self {
        Self {
            camera,
            plane: frame.reference_plane(),
            frame,
            mode,
            throttle: MovementThrottle::new(threshold),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn frame(&self) -> &SurfaceFrame {
        &self.frame
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// Project without throttling
    ///
    /// Deterministic for a fixed camera, plane, frame and viewport.
    pub fn project_point(&self, pixel: Vec2, viewport: Viewport) -> Option<Vec2> {
        self.locate(pixel, viewport).map(|(_, surface)| surface)
    }

    /// Project and emit only if the point cleared the movement threshold
    pub fn project(&mut self, pixel: Vec2, viewport: Viewport) -> Option<Vec2> {
        let (key, surface) = self.locate(pixel, viewport)?;
        if self.throttle.admit(key) {
            Some(surface)
        } else {
            tracing::trace!("pointer movement below threshold, not emitting");
            None
        }
    }

    /// Returns the throttle key (world point, or fraction lifted to 3D in
    /// screen mode) together with the surface coordinate.
    fn locate(&self, pixel: Vec2, viewport: Viewport) -> Option<(Vec3, Vec2)> {
        match self.mode {
            ProjectionMode::Screen => {
                let fraction = viewport.pixel_to_fraction(pixel)?;
                Some((fraction.extend(0.0), fraction))
            }
            ProjectionMode::Surface => {
                let ndc = viewport.pixel_to_ndc(pixel)?;
                let aspect = viewport.aspect()?;
                let ray = self.camera.ray_through_ndc(ndc, aspect);

                let Some(hit) = self.plane.intersect(&ray).filter(|hit| hit.is_finite()) else {
                    tracing::trace!(?pixel, "pointer ray misses reference plane");
                    return None;
                };

                Some((hit, self.frame.to_surface(hit)))
            }
        }
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(
            Camera::default(),
            SurfaceFrame::default(),
            ProjectionMode::Surface,
            DEFAULT_MOVE_THRESHOLD,
        )
    }
}
