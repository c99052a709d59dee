//! Per-frame uniform block
//!
//! Laid out for std140: influence points are padded to `vec4`, and the
//! scalar tail is padded to a multiple of 16 bytes.

use crate::contour::{ContourParams, DisplayMode};
use crate::deformation::DeformationParams;
use crate::influence::{InfluenceField, MAX_INFLUENCE_POINTS};
use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainUniforms {
    /// xy = surface coordinate, zw unused
    pub points: [[f32; 4]; MAX_INFLUENCE_POINTS],
    pub point_count: u32,
    pub time: f32,
    pub radius: f32,
    pub strength: f32,
    pub freq_scale: f32,
    pub time_scale: f32,
    pub height_scale: f32,
    pub levels: u32,
    pub line_width: f32,
    pub edge_margin: f32,
    pub elevation_min: f32,
    pub elevation_max: f32,
    pub max_line_opacity: f32,
    pub dark_mode: u32,
    pub _pad: [u32; 2],
}

impl TerrainUniforms {
    pub fn new(
        time: f32,
        field: &InfluenceField,
        deformation: &DeformationParams,
        contour: &ContourParams,
        mode: DisplayMode,
    ) -> Self {
        let mut points = [[0.0; 4]; MAX_INFLUENCE_POINTS];
        for (slot, point) in points.iter_mut().zip(field.iter()) {
            *slot = [point.x, point.y, 0.0, 0.0];
        }

        Self {
            points,
            point_count: field.len() as u32,
            time,
            radius: deformation.radius,
            strength: deformation.influence_strength,
            freq_scale: deformation.freq_scale,
            time_scale: deformation.time_scale,
            height_scale: deformation.height_scale,
            levels: contour.levels,
            line_width: contour.line_width,
            edge_margin: contour.edge_margin,
            elevation_min: contour.elevation_min,
            elevation_max: contour.elevation_max,
            max_line_opacity: contour.max_line_opacity,
            dark_mode: mode.is_dark() as u32,
            _pad: [0; 2],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
