//! Bounded list of influence points
//!
//! The rendering substrate exposes a fixed uniform array for influence
//! points, so the field is a fixed-size array with an explicit length.
//! Truncation keeps the first [`MAX_INFLUENCE_POINTS`] points in the order
//! they are offered; later points are dropped.

use glam::Vec2;

/// Capacity of the influence uniform array
pub const MAX_INFLUENCE_POINTS: usize = 10;

/// Linear falloff of one point: 1 at the point, 0 at `radius` and beyond
#[inline]
pub fn point_influence(uv: Vec2, point: Vec2, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    ((radius - uv.distance(point)) / radius).max(0.0)
}

/// Surface coordinates that locally raise the terrain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceField {
    points: [Vec2; MAX_INFLUENCE_POINTS],
    len: usize,
}

impl Default for InfluenceField {
    fn default() -> Self {
        Self::new()
    }
}

impl InfluenceField {
    pub const fn new() -> Self {
        Self {
            points: [Vec2::ZERO; MAX_INFLUENCE_POINTS],
            len: 0,
        }
    }

    /// Collect points, keeping the first [`MAX_INFLUENCE_POINTS`]
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut field = Self::new();
        let mut dropped = 0usize;
        for point in points {
            if !field.push(point) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::trace!(dropped, "influence field over capacity, truncated");
        }
        field
    }

    /// Append a point; returns `false` (and ignores it) when full
    pub fn push(&mut self, point: Vec2) -> bool {
        if self.len == MAX_INFLUENCE_POINTS {
            return false;
        }
        self.points[self.len] = point;
        self.len += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_INFLUENCE_POINTS
    }

    pub fn as_slice(&self) -> &[Vec2] {
        &self.points[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.as_slice().iter()
    }

    /// Summed falloff of all active points at `uv`
    pub fn influence_at(&self, uv: Vec2, radius: f32) -> f32 {
        self.iter()
            .map(|&point| point_influence(uv, point, radius))
            .sum()
    }
}
