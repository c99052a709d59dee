//! Contour line opacity dissolves toward every mesh edge

use contour_terrain::{edge_fade, shade, ContourParams, DisplayMode};
use glam::Vec2;

/// Elevation that normalizes onto a band boundary with default params
const ON_LINE: f32 = 0.5;

fn walk_to_edge(from: Vec2, to: Vec2, steps: usize) -> Vec<Vec2> {
    (0..=steps)
        .map(|i| from.lerp(to, i as f32 / steps as f32))
        .collect()
}

#[test]
fn test_line_opacity_non_increasing_toward_each_edge() {
    let params = ContourParams::default();
    let center = Vec2::splat(0.5);
    let edges = [
        Vec2::new(0.0, 0.5),
        Vec2::new(1.0, 0.5),
        Vec2::new(0.5, 0.0),
        Vec2::new(0.5, 1.0),
    ];

    for edge in edges {
        let alphas: Vec<f32> = walk_to_edge(center, edge, 200)
            .into_iter()
            .map(|uv| params.line_alpha(ON_LINE, uv))
            .collect();

        assert!(alphas[0] > 0.0);
        for pair in alphas.windows(2) {
            assert!(pair[1] <= pair[0], "opacity rose toward {edge:?}: {pair:?}");
        }
        assert_eq!(*alphas.last().unwrap(), 0.0);
    }
}

#[test]
fn test_shaded_alpha_vanishes_at_boundary() {
    let params = ContourParams::default();
    for uv in [Vec2::new(0.0, 0.3), Vec2::new(0.7, 1.0), Vec2::ZERO, Vec2::ONE] {
        assert_eq!(shade(ON_LINE, uv, &params, DisplayMode::Dark).a, 0.0);
        assert_eq!(shade(ON_LINE, uv, &params, DisplayMode::Light).a, 0.0);
    }
}

#[test]
fn test_interior_is_unfaded() {
    let margin = ContourParams::default().edge_margin;
    assert_eq!(edge_fade(Vec2::new(margin, margin), margin), 1.0);
    assert!((edge_fade(Vec2::new(1.0 - margin, 0.5), margin) - 1.0).abs() < 1e-5);
    assert!(edge_fade(Vec2::new(margin * 0.5, 0.5), margin) < 1.0);
}
