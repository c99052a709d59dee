//! Per-vertex height field
//!
//! Elevation at a surface coordinate is base noise (sampled over the scaled
//! coordinate and scaled time) plus the summed falloff of every active
//! influence point. The model holds no per-frame state.

use crate::influence::InfluenceField;
use crate::noise::TerrainNoise;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tunable constants of the height field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeformationParams {
    /// Spatial frequency applied to surface coordinates before sampling
    pub freq_scale: f32,
    /// Rate at which the noise evolves over elapsed seconds
    pub time_scale: f32,
    /// Influence radius in surface units
    pub radius: f32,
    /// Height added at the center of one influence point
    pub influence_strength: f32,
    /// Elevation to displacement factor
    pub height_scale: f32,
    /// Noise seed
    pub seed: u32,
}

impl Default for DeformationParams {
    fn default() -> Self {
        Self {
            freq_scale: 3.0,
            time_scale: 0.1,
            radius: 0.2,
            influence_strength: 1.0,
            height_scale: 0.5,
            seed: 0,
        }
    }
}

/// Terrain height field: noise plus influence
#[derive(Debug, Clone)]
pub struct TerrainModel {
    noise: TerrainNoise,
    params: DeformationParams,
}

impl Default for TerrainModel {
    fn default() -> Self {
        Self::new(DeformationParams::default())
    }
}

impl TerrainModel {
    pub fn new(params: DeformationParams) -> Self {
        Self {
            noise: TerrainNoise::new(params.seed),
            params,
        }
    }

    pub fn params(&self) -> &DeformationParams {
        &self.params
    }

    /// Undisturbed noise at `uv` and time `t`
    pub fn base_noise(&self, uv: Vec2, t: f32) -> f32 {
        let p = &self.params;
        self.noise
            .sample(uv.x * p.freq_scale, uv.y * p.freq_scale, t * p.time_scale)
    }

    /// Elevation (the value the shader bands into contours)
    pub fn elevation(&self, uv: Vec2, t: f32, field: &InfluenceField) -> f32 {
        self.base_noise(uv, t)
            + field.influence_at(uv, self.params.radius) * self.params.influence_strength
    }

    /// Vertex offset along the surface normal
    pub fn displacement(&self, uv: Vec2, t: f32, field: &InfluenceField) -> f32 {
        self.elevation(uv, t, field) * self.params.height_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_is_pure_noise() {
        let model = TerrainModel::default();
        let uv = Vec2::new(0.3, 0.6);
        assert_eq!(
            model.elevation(uv, 2.0, &InfluenceField::new()),
            model.base_noise(uv, 2.0)
        );
    }

    #[test]
    fn test_influence_raises_elevation_at_point() {
        let model = TerrainModel::default();
        let p = Vec2::new(0.5, 0.5);
        let field = InfluenceField::from_points([p]);

        let raised = model.elevation(p, 1.0, &field);
        let base = model.base_noise(p, 1.0);
        assert!((raised - base - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_points_beyond_radius_contribute_nothing() {
        let model = TerrainModel::default();
        let uv = Vec2::new(0.1, 0.1);
        let far = InfluenceField::from_points([Vec2::new(0.9, 0.9)]);
        assert_eq!(model.elevation(uv, 0.5, &far), model.base_noise(uv, 0.5));
    }

    #[test]
    fn test_displacement_scales_elevation() {
        let params = DeformationParams {
            height_scale: 2.0,
            ..Default::default()
        };
        let model = TerrainModel::new(params);
        let uv = Vec2::new(0.42, 0.17);
        let field = InfluenceField::from_points([Vec2::new(0.4, 0.2)]);
        let e = model.elevation(uv, 3.0, &field);
        assert_eq!(model.displacement(uv, 3.0, &field), e * 2.0);
    }
}
