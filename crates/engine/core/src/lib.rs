//! Core library for the shared contour terrain - generic components with no
//! transport or rendering dependencies.
//!
//! # Modules
//!
//! - [`camera`]: perspective camera with look-at construction and ray casting
//! - [`input`]: viewport and pointer input types
//! - [`projection`]: screen → world → terrain surface coordinate pipeline

pub mod camera;
pub mod input;
pub mod projection;

pub use camera::{Camera, DEFAULT_VFOV};
pub use input::{PointerInput, PointerTracker, Viewport};
pub use projection::{
    MovementThrottle, Plane, ProjectionMode, Projector, Ray, SurfaceFrame, DEFAULT_MOVE_THRESHOLD,
};
