//! Displaced terrain grid
//!
//! The mesh is a regular grid in the surface's local XZ plane, centered on
//! the local origin, with `+Y` as the surface normal. Each vertex is pushed
//! along `+Y` by the model's displacement at its surface coordinate.
//! Buffers are flat `f32`/`u32` arrays ready for upload.

use crate::deformation::TerrainModel;
use crate::influence::InfluenceField;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Surface-space step used for finite-difference normals
const NORMAL_EPSILON: f32 = 1.0e-3;

/// Grid resolution and extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    pub segments_x: u32,
    pub segments_z: u32,
    /// Local extent along X and Z
    pub size: Vec2,
}

impl Default for TerrainGrid {
    fn default() -> Self {
        Self {
            segments_x: 128,
            segments_z: 128,
            size: Vec2::splat(10.0),
        }
    }
}

/// Evaluated mesh buffers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerrainMeshData {
    /// Local positions, xyz per vertex
    pub positions: Vec<f32>,
    /// Unit normals, xyz per vertex
    pub normals: Vec<f32>,
    /// Surface coordinates, uv per vertex
    pub uvs: Vec<f32>,
    /// Elevation per vertex, interpolated by the shading pass
    pub elevations: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TerrainMeshData {
    pub fn vertex_count(&self) -> usize {
        self.elevations.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[index * 3..index * 3 + 3])
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.normals[index * 3..index * 3 + 3])
    }

    /// Position buffer as raw bytes
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl TerrainGrid {
    pub fn new(segments_x: u32, segments_z: u32, size: Vec2) -> Self {
        Self {
            segments_x: segments_x.max(1),
            segments_z: segments_z.max(1),
            size,
        }
    }

    pub fn vertex_count(&self) -> usize {
        (self.segments_x as usize + 1) * (self.segments_z as usize + 1)
    }

    /// Local position of a surface coordinate at a given height
    pub fn local_position(&self, uv: Vec2, height: f32) -> Vec3 {
        Vec3::new(
            (uv.x - 0.5) * self.size.x,
            height,
            (uv.y - 0.5) * self.size.y,
        )
    }

    /// Evaluate the displaced mesh at time `t`
    pub fn evaluate(&self, model: &TerrainModel, t: f32, field: &InfluenceField) -> TerrainMeshData {
        let sx = self.segments_x.max(1);
        let sz = self.segments_z.max(1);
        let count = self.vertex_count();
        let height_scale = model.params().height_scale;

        let mut mesh = TerrainMeshData {
            positions: Vec::with_capacity(count * 3),
            normals: Vec::with_capacity(count * 3),
            uvs: Vec::with_capacity(count * 2),
            elevations: Vec::with_capacity(count),
            indices: Vec::with_capacity(sx as usize * sz as usize * 6),
        };

        for j in 0..=sz {
            for i in 0..=sx {
                let uv = Vec2::new(i as f32 / sx as f32, j as f32 / sz as f32);
                let elevation = model.elevation(uv, t, field);
                let position = self.local_position(uv, elevation * height_scale);
                let normal = self.normal_at(model, uv, t, field);

                mesh.positions.extend_from_slice(&position.to_array());
                mesh.normals.extend_from_slice(&normal.to_array());
                mesh.uvs.extend_from_slice(&uv.to_array());
                mesh.elevations.push(elevation);
            }
        }

        let row = sx + 1;
        for j in 0..sz {
            for i in 0..sx {
                let a = j * row + i;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        mesh
    }

    /// Central-difference normal of the displaced surface
    fn normal_at(&self, model: &TerrainModel, uv: Vec2, t: f32, field: &InfluenceField) -> Vec3 {
        let e = NORMAL_EPSILON;
        let h = |du: f32, dv: f32| model.displacement(uv + Vec2::new(du, dv), t, field);

        let dh_dx = (h(e, 0.0) - h(-e, 0.0)) / (2.0 * e * self.size.x);
        let dh_dz = (h(0.0, e) - h(0.0, -e)) / (2.0 * e * self.size.y);

        Vec3::new(-dh_dx, 1.0, -dh_dz).normalize_or(Vec3::Y)
    }
}
