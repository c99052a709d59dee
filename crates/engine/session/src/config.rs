//! Session configuration
//!
//! Loaded from TOML, then overridden from `CONTOUR_*` environment variables.
//! Every section has defaults, so an empty file is a valid configuration.

use crate::smoothing::{SmoothingEngine, SmoothingMode, DEFAULT_AVATAR_LERP, DEFAULT_FIELD_LERP};
use contour_core::{Camera, ProjectionMode, Projector, SurfaceFrame, DEFAULT_MOVE_THRESHOLD};
use contour_terrain::{ContourParams, DeformationParams, DisplayMode, TerrainGrid};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Well-known room every peer joins
pub const DEFAULT_ROOM: &str = "demo";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub avatar_lerp: f32,
    pub field_lerp: f32,
    pub mode: SmoothingMode,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            avatar_lerp: DEFAULT_AVATAR_LERP,
            field_lerp: DEFAULT_FIELD_LERP,
            mode: SmoothingMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub mode: ProjectionMode,
    /// Minimum movement (world units) before a new position is broadcast
    pub move_threshold: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::default(),
            move_threshold: DEFAULT_MOVE_THRESHOLD,
        }
    }
}

/// Placement and resolution of the terrain mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub origin: Vec3,
    pub size: Vec2,
    pub segments: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            size: Vec2::splat(10.0),
            segments: 128,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub vfov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 6.0, 8.0),
            target: Vec3::ZERO,
            vfov_degrees: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub room: String,
    pub display_mode: DisplayMode,
    pub smoothing: SmoothingConfig,
    pub projection: ProjectionConfig,
    pub surface: SurfaceConfig,
    pub camera: CameraConfig,
    pub terrain: DeformationParams,
    pub contour: ContourParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            room: DEFAULT_ROOM.to_string(),
            display_mode: DisplayMode::default(),
            smoothing: SmoothingConfig::default(),
            projection: ProjectionConfig::default(),
            surface: SurfaceConfig::default(),
            camera: CameraConfig::default(),
            terrain: DeformationParams::default(),
            contour: ContourParams::default(),
        }
    }
}

impl SessionConfig {
    /// Read and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults or file, then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `CONTOUR_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparseable values are skipped
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(room) = lookup("CONTOUR_ROOM").filter(|room| !room.trim().is_empty()) {
            self.room = room.trim().to_string();
        }

        if let Some(value) = lookup("CONTOUR_DISPLAY_MODE") {
            match value.parse() {
                Ok(mode) => self.display_mode = mode,
                Err(e) => tracing::warn!("ignoring CONTOUR_DISPLAY_MODE: {e}"),
            }
        }

        if let Some(lerp) = parse_f32(&lookup, "CONTOUR_AVATAR_LERP") {
            self.smoothing.avatar_lerp = lerp;
        }
        if let Some(lerp) = parse_f32(&lookup, "CONTOUR_FIELD_LERP") {
            self.smoothing.field_lerp = lerp;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room.trim().is_empty() {
            return Err(invalid("room must not be empty"));
        }
        for (name, lerp) in [
            ("smoothing.avatar_lerp", self.smoothing.avatar_lerp),
            ("smoothing.field_lerp", self.smoothing.field_lerp),
        ] {
            if !(lerp > 0.0 && lerp < 1.0) {
                return Err(invalid(format!("{name} must be in (0, 1), got {lerp}")));
            }
        }
        if let SmoothingMode::TimeScaled { reference_dt } = self.smoothing.mode {
            if !(reference_dt > 0.0) {
                return Err(invalid("smoothing.mode.reference_dt must be positive"));
            }
        }
        if !(self.projection.move_threshold >= 0.0) {
            return Err(invalid("projection.move_threshold must be >= 0"));
        }
        if !(self.surface.size.x > 0.0 && self.surface.size.y > 0.0) {
            return Err(invalid("surface.size must be positive"));
        }
        if self.surface.segments == 0 {
            return Err(invalid("surface.segments must be >= 1"));
        }
        if !(self.camera.position.is_finite() && self.camera.target.is_finite()) {
            return Err(invalid("camera.position and camera.target must be finite"));
        }
        if self.camera.position.distance_squared(self.camera.target) < 1e-8 {
            return Err(invalid("camera.target must differ from camera.position"));
        }
        if !(self.camera.vfov_degrees > 0.0 && self.camera.vfov_degrees < 180.0) {
            return Err(invalid("camera.vfov_degrees must be in (0, 180)"));
        }
        if !(self.terrain.radius > 0.0) {
            return Err(invalid("terrain.radius must be positive"));
        }
        if self.contour.levels == 0 {
            return Err(invalid("contour.levels must be >= 1"));
        }
        if !(self.contour.edge_margin >= 0.0 && self.contour.edge_margin < 0.5) {
            return Err(invalid("contour.edge_margin must be in [0, 0.5)"));
        }
        if !(self.contour.elevation_max > self.contour.elevation_min) {
            return Err(invalid("contour.elevation_max must exceed elevation_min"));
        }
        Ok(())
    }

    pub fn camera(&self) -> Camera {
        Camera::look_at(self.camera.position, self.camera.target, Vec3::Y)
            .with_vfov(self.camera.vfov_degrees.to_radians())
    }

    pub fn surface_frame(&self) -> SurfaceFrame {
        SurfaceFrame::new(self.surface.origin, self.surface.size)
    }

    pub fn grid(&self) -> TerrainGrid {
        TerrainGrid::new(self.surface.segments, self.surface.segments, self.surface.size)
    }

    pub fn projector(&self) -> Projector {
        Projector::new(
            self.camera(),
            self.surface_frame(),
            self.projection.mode,
            self.projection.move_threshold,
        )
    }

    pub fn smoothing_engine(&self) -> SmoothingEngine {
        SmoothingEngine::new(
            self.smoothing.avatar_lerp,
            self.smoothing.field_lerp,
            self.smoothing.mode,
        )
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn parse_f32<F>(lookup: &F, key: &str) -> Option<f32>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key)?;
    match value.trim().parse::<f32>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("ignoring {key}={value}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.room, "demo");
        assert_eq!(config.display_mode, DisplayMode::Dark);
        assert_eq!(config.smoothing.avatar_lerp, 0.1);
        assert_eq!(config.smoothing.field_lerp, 0.2);
    }

    #[test]
    fn test_from_file_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
room = "lobby"
display_mode = "light"

[smoothing]
avatar_lerp = 0.05
mode = {{ kind = "per_frame" }}

[projection]
mode = "screen"

[contour]
levels = 12
"#
        )
        .unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.room, "lobby");
        assert_eq!(config.display_mode, DisplayMode::Light);
        assert_eq!(config.smoothing.avatar_lerp, 0.05);
        assert_eq!(config.smoothing.field_lerp, 0.2);
        assert_eq!(config.smoothing.mode, SmoothingMode::PerFrame);
        assert_eq!(config.projection.mode, ProjectionMode::Screen);
        assert_eq!(config.contour.levels, 12);
        assert_eq!(config.contour.line_width, 0.08);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[smoothing]\nfield_lerp = 1.5").unwrap();
        assert!(matches!(
            SessionConfig::from_file(file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        writeln!(broken, "room = ").unwrap();
        assert!(matches!(
            SessionConfig::from_file(broken.path()),
            Err(ConfigError::Parse(_))
        ));

        assert!(matches!(
            SessionConfig::from_file("/nonexistent/contour.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CONTOUR_ROOM", "studio"),
            ("CONTOUR_DISPLAY_MODE", "light"),
            ("CONTOUR_AVATAR_LERP", "0.3"),
            ("CONTOUR_FIELD_LERP", "fast"),
        ]
        .into_iter()
        .collect();

        let mut config = SessionConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.room, "studio");
        assert_eq!(config.display_mode, DisplayMode::Light);
        assert_eq!(config.smoothing.avatar_lerp, 0.3);
        // Unparseable value leaves the default
        assert_eq!(config.smoothing.field_lerp, 0.2);
    }

    #[test]
    fn test_camera_target_must_differ_from_position() {
        let mut config = SessionConfig::default();
        config.camera.target = config.camera.position;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.camera.target = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_straight_down_camera_projects() {
        let mut config = SessionConfig::default();
        config.camera.position = Vec3::new(0.0, 10.0, 0.0);
        config.camera.target = Vec3::ZERO;
        assert!(config.validate().is_ok());
        assert!(config.camera().rotation.is_finite());

        let viewport = contour_core::Viewport::new(800.0, 600.0);
        let uv = config
            .projector()
            .project_point(Vec2::new(400.0, 300.0), viewport)
            .unwrap();
        assert!((uv - Vec2::splat(0.5)).length() < 1e-4);
    }

    #[test]
    fn test_grid_follows_surface_segments() {
        let mut config = SessionConfig::default();
        config.surface.segments = 4;
        assert_eq!(config.grid().vertex_count(), 25);
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = SessionConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: SessionConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
