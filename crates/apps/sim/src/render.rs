//! ASCII rendering of one frame
//!
//! Each character cell samples the contour shading at its center; line
//! opacity picks a glyph from a density ramp. Markers overwrite the cell
//! under their smoothed position.

use contour_session::active_cursor_label;
use contour_session::FrameOutput;
use contour_terrain::{ContourParams, Marker, TerrainModel};
use glam::Vec2;
use std::fmt::Write;

/// Glyphs from faint to opaque line
const RAMP: [char; 4] = ['.', ':', '=', '#'];

/// Glyph for a shaded line alpha, space between lines
pub fn glyph(alpha: f32, max_alpha: f32) -> char {
    if alpha <= 0.0 || max_alpha <= 0.0 {
        return ' ';
    }
    let level = (alpha / max_alpha * RAMP.len() as f32).ceil() as usize;
    RAMP[level.clamp(1, RAMP.len()) - 1]
}

/// Cell under a surface coordinate
fn cell(surface: Vec2, width: usize, height: usize) -> (usize, usize) {
    let col = ((surface.x * width as f32) as usize).min(width.saturating_sub(1));
    let row = ((surface.y * height as f32) as usize).min(height.saturating_sub(1));
    (col, row)
}

fn marker_glyph(marker: &Marker) -> char {
    if marker.is_local {
        return '@';
    }
    marker
        .label
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?')
}

/// Render the terrain seen in `frame` as `height` lines of `width` glyphs
pub fn render_frame(
    frame: &FrameOutput,
    model: &TerrainModel,
    contour: &ContourParams,
    width: usize,
    height: usize,
) -> Vec<String> {
    let mut grid = vec![vec![' '; width]; height];

    for (row, line) in grid.iter_mut().enumerate() {
        for (col, glyph_slot) in line.iter_mut().enumerate() {
            let uv = Vec2::new(
                (col as f32 + 0.5) / width as f32,
                (row as f32 + 0.5) / height as f32,
            );
            let elevation = model.elevation(uv, frame.time, &frame.influence);
            *glyph_slot = glyph(contour.line_alpha(elevation, uv), contour.max_line_opacity);
        }
    }

    if width > 0 && height > 0 {
        for marker in &frame.markers {
            let (col, row) = cell(marker.surface, width, height);
            grid[row][col] = marker_glyph(marker);
        }
    }

    grid.into_iter().map(|line| line.into_iter().collect()).collect()
}

/// Legend and session summary printed under the terrain
pub fn summary(frame: &FrameOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} | {} | t={:.2}s | {} influence point(s)",
        frame.status,
        active_cursor_label(frame.peer_count),
        frame.time,
        frame.influence.len()
    );
    for marker in &frame.markers {
        let _ = writeln!(
            out,
            "  {} {:<6} ({:.2}, {:.2})",
            marker_glyph(marker),
            marker.label,
            marker.surface.x,
            marker.surface.y
        );
    }
    out
}
