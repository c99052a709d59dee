//! Viewport and pointer input types
//!
//! Pointer positions are device pixels with the origin at the top-left
//! corner of the viewport.

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ============================================================================
// Viewport
// ============================================================================

/// Size of the rendering surface in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A viewport with no area cannot be projected through
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width / height, or `None` for an empty viewport
    pub fn aspect(&self) -> Option<f32> {
        (!self.is_empty()).then(|| self.width / self.height)
    }

    /// Check whether a pixel position lies inside the viewport
    pub fn contains(&self, pixel: Vec2) -> bool {
        pixel.is_finite()
            && pixel.x >= 0.0
            && pixel.y >= 0.0
            && pixel.x <= self.width
            && pixel.y <= self.height
    }

    /// Convert a pixel position to a `[0, 1]²` viewport fraction
    pub fn pixel_to_fraction(&self, pixel: Vec2) -> Option<Vec2> {
        if self.is_empty() || !self.contains(pixel) {
            return None;
        }
        Some(Vec2::new(pixel.x / self.width, pixel.y / self.height))
    }

    /// Convert a pixel position to normalized device coordinates in `[-1, 1]²`
    ///
    /// Y is flipped so +1 is the top edge.
    pub fn pixel_to_ndc(&self, pixel: Vec2) -> Option<Vec2> {
        let fraction = self.pixel_to_fraction(pixel)?;
        Some(Vec2::new(fraction.x * 2.0 - 1.0, 1.0 - fraction.y * 2.0))
    }
}

// ============================================================================
// Pointer
// ============================================================================

/// Pointer events consumed by the projection pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerInput {
    /// Pointer moved to a pixel position
    Moved { x: f32, y: f32 },
    /// Page or camera scrolled under a stationary pointer
    Scrolled,
    /// Pointer left the viewport
    Left,
}

/// Remembers the last pointer pixel position so scroll events can be
/// re-projected from it
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    last: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed an input event, returning the pixel position to project (if any)
    pub fn track(&mut self, input: PointerInput) -> Option<Vec2> {
        match input {
            PointerInput::Moved { x, y } => {
                let pixel = Vec2::new(x, y);
                self.last = Some(pixel);
                Some(pixel)
            }
            PointerInput::Scrolled => self.last,
            PointerInput::Left => {
                self.last = None;
                None
            }
        }
    }

    /// Last known pointer position
    pub fn last(&self) -> Option<Vec2> {
        self.last
    }
}
