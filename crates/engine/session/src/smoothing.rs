//! Exponential smoothing of tracked positions
//!
//! Each frame every smoothed copy closes a fraction of its remaining
//! distance to the raw target. Markers and the influence field use separate
//! fractions. In `TimeScaled` mode the fraction is normalized to a reference
//! frame time so motion speed does not depend on the refresh rate.

use crate::store::CursorStateStore;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Reference frame time for time-scaled smoothing (60 Hz)
pub const REFERENCE_DT: f32 = 1.0 / 60.0;

pub const DEFAULT_AVATAR_LERP: f32 = 0.1;
pub const DEFAULT_FIELD_LERP: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmoothingMode {
    /// Fixed fraction per frame regardless of frame time
    PerFrame,
    /// Fraction `1 - (1 - f)^(dt / reference_dt)`
    TimeScaled { reference_dt: f32 },
}

impl Default for SmoothingMode {
    fn default() -> Self {
        Self::TimeScaled {
            reference_dt: REFERENCE_DT,
        }
    }
}

/// Fraction of the remaining distance closed this frame
pub fn step_factor(lerp: f32, dt: f32, mode: SmoothingMode) -> f32 {
    match mode {
        SmoothingMode::PerFrame => lerp.clamp(0.0, 1.0),
        SmoothingMode::TimeScaled { reference_dt } => {
            if dt <= 0.0 || reference_dt <= 0.0 {
                return 0.0;
            }
            let keep = (1.0 - lerp.clamp(0.0, 1.0)).powf(dt / reference_dt);
            (1.0 - keep).clamp(0.0, 1.0)
        }
    }
}

#[inline]
fn approach(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    current + (target - current) * factor
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingEngine {
    /// Marker smoothing fraction
    pub avatar: f32,
    /// Influence field smoothing fraction
    pub field: f32,
    pub mode: SmoothingMode,
}

impl Default for SmoothingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_AVATAR_LERP, DEFAULT_FIELD_LERP, SmoothingMode::default())
    }
}

impl SmoothingEngine {
    pub fn new(avatar: f32, field: f32, mode: SmoothingMode) -> Self {
        Self {
            avatar,
            field,
            mode,
        }
    }

    /// Advance every tracked entry by one frame of `dt` seconds
    pub fn step(&self, store: &mut CursorStateStore, dt: f32) {
        let avatar = step_factor(self.avatar, dt, self.mode);
        let field = step_factor(self.field, dt, self.mode);

        for entry in store.iter_mut() {
            if let Some(position) = entry.position.as_mut() {
                position.avatar = approach(position.avatar, position.raw, avatar);
                position.field = approach(position.field, position.raw, field);
            }
        }
    }
}
