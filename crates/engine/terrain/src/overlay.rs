//! Peer marker overlay
//!
//! Markers sit on the displaced surface at each peer's smoothed avatar
//! position, lifted slightly so they never sink into the terrain.

use crate::color::Rgba;
use crate::deformation::TerrainModel;
use crate::influence::InfluenceField;
use contour_core::SurfaceFrame;
use glam::{Vec2, Vec3};

/// Height above the displaced surface at which markers float
pub const MARKER_LIFT: f32 = 0.15;

/// One peer as seen by the overlay pass
#[derive(Debug, Clone, Copy)]
pub struct MarkerInput<'a> {
    pub id: &'a str,
    pub label: &'a str,
    /// Palette string, e.g. `#FF5733`
    pub color: &'a str,
    /// Smoothed avatar position in surface coordinates
    pub surface: Vec2,
    pub is_local: bool,
}

/// Placed marker ready for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub label: String,
    pub color: Rgba,
    pub surface: Vec2,
    pub world: Vec3,
    pub is_local: bool,
}

/// Place one marker per input on the displaced surface
pub fn build_markers<'a, I>(
    inputs: I,
    frame: &SurfaceFrame,
    model: &TerrainModel,
    time: f32,
    field: &InfluenceField,
) -> Vec<Marker>
where
    I: IntoIterator<Item = MarkerInput<'a>>,
{
    inputs
        .into_iter()
        .map(|input| {
            let surface = input.surface.clamp(Vec2::ZERO, Vec2::ONE);
            let height = model.displacement(surface, time, field) + MARKER_LIFT;
            let color = Rgba::from_hex(input.color).unwrap_or_else(|| {
                tracing::debug!(id = input.id, color = input.color, "unparseable marker color");
                Rgba::WHITE
            });

            Marker {
                id: input.id.to_string(),
                label: input.label.to_string(),
                color,
                surface,
                world: frame.to_world(surface, height),
                is_local: input.is_local,
            }
        })
        .collect()
}
