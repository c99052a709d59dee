//! Benchmarks for per-pixel shading and per-frame mesh evaluation
//!
//! Both run with a full influence field, the worst case the renderer sees.

use contour_terrain::{
    shade, ContourParams, DisplayMode, InfluenceField, TerrainGrid, TerrainModel,
    MAX_INFLUENCE_POINTS,
};
use criterion::{criterion_group, criterion_main, Criterion};
use glam::Vec2;
use std::hint::black_box;

fn full_field() -> InfluenceField {
    InfluenceField::from_points((0..MAX_INFLUENCE_POINTS).map(|i| {
        let a = i as f32 / MAX_INFLUENCE_POINTS as f32 * std::f32::consts::TAU;
        Vec2::new(0.5 + 0.3 * a.cos(), 0.5 + 0.3 * a.sin())
    }))
}

fn bench_shade(c: &mut Criterion) {
    let model = TerrainModel::default();
    let params = ContourParams::default();
    let field = full_field();
    let size = 64;

    c.bench_function("shade_64x64", |b| {
        b.iter(|| {
            let mut lit = 0u32;
            for y in 0..size {
                for x in 0..size {
                    let uv = Vec2::new(x as f32 / size as f32, y as f32 / size as f32);
                    let elevation = model.elevation(uv, black_box(1.25), &field);
                    if shade(elevation, uv, &params, DisplayMode::Dark).a > 0.0 {
                        lit += 1;
                    }
                }
            }
            black_box(lit)
        })
    });
}

fn bench_mesh(c: &mut Criterion) {
    let model = TerrainModel::default();
    let field = full_field();
    let mut group = c.benchmark_group("mesh_evaluate");

    for segments in [32u32, 128] {
        let grid = TerrainGrid::new(segments, segments, Vec2::splat(10.0));
        group.bench_function(format!("{segments}x{segments}"), |b| {
            b.iter(|| black_box(grid.evaluate(&model, black_box(0.5), &field)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shade, bench_mesh);
criterion_main!(benches);
