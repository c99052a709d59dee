//! Procedural contour terrain.
//!
//! The terrain is a pure function of elapsed time and an influence field:
//! coherent 3D noise sampled over surface coordinates, raised locally around
//! each influence point, displaced along the mesh normal and shaded as
//! topographic contour lines that fade out toward the mesh edges.
//!
//! # Modules
//!
//! - [`noise`]: seeded coherent gradient noise
//! - [`influence`]: fixed-capacity influence point list
//! - [`deformation`]: per-vertex elevation and displacement
//! - [`contour`]: per-pixel banding, line emission and edge fade
//! - [`mesh`]: displaced grid evaluation (positions, normals, indices)
//! - [`overlay`]: per-peer marker placement on the displaced surface
//! - [`uniforms`]: per-frame uniform block for the rendering substrate

pub mod color;
pub mod contour;
pub mod deformation;
pub mod influence;
pub mod mesh;
pub mod noise;
pub mod overlay;
pub mod uniforms;

pub use color::Rgba;
pub use contour::{edge_fade, shade, smoothstep, Band, ContourParams, DisplayMode};
pub use deformation::{DeformationParams, TerrainModel};
pub use influence::{InfluenceField, MAX_INFLUENCE_POINTS};
pub use mesh::{TerrainGrid, TerrainMeshData};
pub use self::noise::TerrainNoise;
pub use overlay::{build_markers, Marker, MarkerInput};
pub use uniforms::TerrainUniforms;
