//! Contour banding and edge fade
//!
//! Per-pixel shading: elevation is normalized into `[0, 1]`, quantized into
//! `levels` bands, and only pixels within `line_width` of a band boundary
//! emit a line. Line opacity grows with the boundary's height and is
//! attenuated by a smooth fade on all four surface edges. Elevation outside
//! the banded range draws nothing.

use crate::color::Rgba;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Light/dark presentation flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Light,
    #[default]
    Dark,
}

impl DisplayMode {
    /// Contour line color
    pub fn line_color(self) -> Rgba {
        match self {
            Self::Dark => Rgba::WHITE,
            // #4b5563
            Self::Light => Rgba::from_rgb8(0x4b, 0x55, 0x63),
        }
    }

    /// Color between lines
    pub fn background(self) -> Rgba {
        Rgba::TRANSPARENT
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl std::str::FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown display mode: {other}")),
        }
    }
}

/// Contour banding constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    /// Number of discrete elevation bands
    pub levels: u32,
    /// Half-width of a contour line, as a fraction of one band
    pub line_width: f32,
    /// Width of the fade zone on each surface edge
    pub edge_margin: f32,
    /// Elevation mapped to band space 0
    pub elevation_min: f32,
    /// Elevation mapped to band space 1
    pub elevation_max: f32,
    /// Opacity of the topmost contour line
    pub max_line_opacity: f32,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            levels: 8,
            line_width: 0.08,
            edge_margin: 0.15,
            elevation_min: -1.0,
            elevation_max: 2.0,
            max_line_opacity: 0.6,
        }
    }
}

/// Position of an elevation inside its band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub index: u32,
    /// Fraction of the band above its floor, in `[0, 1)`
    pub distance_from_floor: f32,
}

impl ContourParams {
    /// Map elevation into `[0, 1]` band space
    pub fn normalize(&self, elevation: f32) -> f32 {
        let span = self.elevation_max - self.elevation_min;
        if span <= 0.0 || !elevation.is_finite() {
            return 0.0;
        }
        ((elevation - self.elevation_min) / span).clamp(0.0, 1.0)
    }

    /// Band containing a normalized elevation
    pub fn band(&self, normalized: f32) -> Band {
        let levels = self.levels.max(1);
        let scaled = normalized.clamp(0.0, 1.0) * levels as f32;
        let floor = scaled.floor();
        Band {
            index: (floor as u32).min(levels),
            distance_from_floor: scaled - floor,
        }
    }

    /// Whether a band position lies on a contour line
    pub fn is_contour(&self, band: Band) -> bool {
        band.distance_from_floor < self.line_width
            || band.distance_from_floor > 1.0 - self.line_width
    }

    /// Opacity of the line nearest to `band`, before edge fade
    pub fn line_opacity(&self, band: Band) -> f32 {
        let levels = self.levels.max(1);
        let boundary = if band.distance_from_floor < 0.5 {
            band.index
        } else {
            band.index + 1
        }
        .min(levels);
        let height = boundary as f32 / levels as f32;
        self.max_line_opacity * (0.25 + 0.75 * height)
    }

    /// Whether an elevation falls inside the banded range
    ///
    /// Elevation beyond either end (stacked influence points, deep noise
    /// troughs) is band interior, never a line.
    pub fn in_range(&self, elevation: f32) -> bool {
        (self.elevation_min..=self.elevation_max).contains(&elevation)
    }

    /// Line alpha at a pixel, edge fade included; 0 between lines
    pub fn line_alpha(&self, elevation: f32, uv: Vec2) -> f32 {
        if !self.in_range(elevation) {
            return 0.0;
        }
        let band = self.band(self.normalize(elevation));
        if !self.is_contour(band) {
            return 0.0;
        }
        self.line_opacity(band) * edge_fade(uv, self.edge_margin)
    }
}

/// Hermite interpolation between `edge0` and `edge1`
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 == edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rectangular fade: 0 on every edge, 1 farther than `margin` from all edges
pub fn edge_fade(uv: Vec2, margin: f32) -> f32 {
    if margin <= 0.0 {
        return 1.0;
    }
    smoothstep(0.0, margin, uv.x)
        * smoothstep(0.0, margin, 1.0 - uv.x)
        * smoothstep(0.0, margin, uv.y)
        * smoothstep(0.0, margin, 1.0 - uv.y)
}

/// Per-pixel shading function
pub fn shade(elevation: f32, uv: Vec2, params: &ContourParams, mode: DisplayMode) -> Rgba {
    let alpha = params.line_alpha(elevation, uv);
    if alpha <= 0.0 {
        return mode.background();
    }
    mode.line_color().with_alpha(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps() {
        let params = ContourParams::default();
        assert_eq!(params.normalize(-1.0), 0.0);
        assert_eq!(params.normalize(2.0), 1.0);
        assert_eq!(params.normalize(-5.0), 0.0);
        assert_eq!(params.normalize(f32::NAN), 0.0);
        assert!((params.normalize(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_elevation_draws_no_line() {
        let params = ContourParams::default();
        let center = Vec2::splat(0.5);

        assert!(params.line_alpha(params.elevation_max, center) > 0.0);
        assert!(params.line_alpha(params.elevation_min, center) > 0.0);
        assert_eq!(params.line_alpha(2.5, center), 0.0);
        assert_eq!(params.line_alpha(10.0, center), 0.0);
        assert_eq!(params.line_alpha(-3.0, center), 0.0);
        assert_eq!(params.line_alpha(f32::NAN, center), 0.0);
    }

    #[test]
    fn test_band_quantization() {
        let params = ContourParams::default();
        let band = params.band(0.3);
        assert_eq!(band.index, 2);
        assert!((band.distance_from_floor - 0.4).abs() < 1e-5);

        assert!(!params.is_contour(band));
        assert!(params.is_contour(params.band(0.25)));
    }

    #[test]
    fn test_higher_lines_are_more_opaque() {
        let params = ContourParams::default();
        let low = params.line_opacity(params.band(0.125));
        let high = params.line_opacity(params.band(0.875));
        assert!(high > low);
        assert!((params.line_opacity(params.band(1.0)) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
        assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
    }

    #[test]
    fn test_edge_fade_zero_on_boundary() {
        assert_eq!(edge_fade(Vec2::new(0.0, 0.5), 0.15), 0.0);
        assert_eq!(edge_fade(Vec2::new(0.5, 1.0), 0.15), 0.0);
        assert_eq!(edge_fade(Vec2::new(0.5, 0.5), 0.15), 1.0);
        assert_eq!(edge_fade(Vec2::new(0.0, 0.0), 0.0), 1.0);
    }

    #[test]
    fn test_shade_by_display_mode() {
        let params = ContourParams::default();
        let uv = Vec2::splat(0.5);
        // Elevation 0.5 normalizes to exactly a band boundary
        let dark = shade(0.5, uv, &params, DisplayMode::Dark);
        let light = shade(0.5, uv, &params, DisplayMode::Light);
        assert_eq!((dark.r, dark.g, dark.b), (1.0, 1.0, 1.0));
        assert!(light.r < 0.5);
        assert!(dark.a > 0.0);
        assert_eq!(dark.a, light.a);

        // Mid-band is background
        let between = shade(-1.0 + 3.0 * 0.3, uv, &params, DisplayMode::Dark);
        assert_eq!(between, Rgba::TRANSPARENT);
    }

    #[test]
    fn test_display_mode_from_str() {
        assert_eq!("Light".parse::<DisplayMode>(), Ok(DisplayMode::Light));
        assert_eq!("dark".parse::<DisplayMode>(), Ok(DisplayMode::Dark));
        assert!("sepia".parse::<DisplayMode>().is_err());
    }
}
