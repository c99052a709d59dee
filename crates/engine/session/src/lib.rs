//! Shared cursor session for the contour terrain.
//!
//! Tracks every peer's pointer, smooths it, and keeps peers in sync over a
//! [`contour_network::SessionTransport`]. [`SessionController`] ties the
//! pieces into one explicit per-frame `update(dt, inputs) -> outputs` step.
//!
//! # Modules
//!
//! - [`store`]: cursor state store (peer id → raw and smoothed positions)
//! - [`smoothing`]: frame-rate normalized exponential smoothing
//! - [`bridge`]: wire encoding, inbound merge and status tracking
//! - [`controller`]: per-frame orchestration
//! - [`config`]: TOML configuration with environment overrides
//! - [`palette`]: peer colors and labels

pub mod bridge;
pub mod config;
pub mod controller;
pub mod palette;
pub mod smoothing;
pub mod store;

pub use bridge::{BridgeEvent, SessionBridge};
pub use config::{ConfigError, SessionConfig, DEFAULT_ROOM};
pub use controller::{FrameInputs, FrameOutput, SessionController};
pub use palette::{active_cursor_label, random_color, COLORS, LOCAL_LABEL};
pub use smoothing::{SmoothingEngine, SmoothingMode};
pub use store::{CursorEntry, CursorStateStore, TrackedPosition};
