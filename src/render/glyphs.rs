//! Stroked vector glyphs for pin numbers and the redaction indicator
//!
//! Glyphs are polylines in a unit cell (0.6 wide, 1.0 tall, y down) so the
//! output never depends on which fonts the host has installed.

use tiny_skia::{LineCap, LineJoin, Path, PathBuilder, Stroke};

use crate::domain::Point;

/// Glyph cell width relative to its height
pub const GLYPH_WIDTH: f32 = 0.6;
/// Horizontal advance between glyphs relative to height
pub const ADVANCE: f32 = 0.8;
/// Stroke width relative to height
pub const STROKE_RATIO: f32 = 0.16;

type Polyline = &'static [(f32, f32)];

fn strokes(c: char) -> &'static [Polyline] {
    match c {
        '0' => &[&[(0.0, 0.0), (0.6, 0.0), (0.6, 1.0), (0.0, 1.0), (0.0, 0.0)]],
        '1' => &[&[(0.1, 0.2), (0.35, 0.0), (0.35, 1.0)], &[(0.1, 1.0), (0.6, 1.0)]],
        '2' => &[&[(0.0, 0.0), (0.6, 0.0), (0.6, 0.5), (0.0, 0.5), (0.0, 1.0), (0.6, 1.0)]],
        '3' => &[&[(0.0, 0.0), (0.6, 0.0), (0.6, 1.0), (0.0, 1.0)], &[(0.1, 0.5), (0.6, 0.5)]],
        '4' => &[&[(0.0, 0.0), (0.0, 0.5), (0.6, 0.5)], &[(0.6, 0.0), (0.6, 1.0)]],
        '5' => &[&[(0.6, 0.0), (0.0, 0.0), (0.0, 0.5), (0.6, 0.5), (0.6, 1.0), (0.0, 1.0)]],
        '6' => &[&[(0.6, 0.0), (0.0, 0.0), (0.0, 1.0), (0.6, 1.0), (0.6, 0.5), (0.0, 0.5)]],
        '7' => &[&[(0.0, 0.0), (0.6, 0.0), (0.6, 1.0)]],
        '8' => &[
            &[(0.0, 0.0), (0.6, 0.0), (0.6, 1.0), (0.0, 1.0), (0.0, 0.0)],
            &[(0.0, 0.5), (0.6, 0.5)],
        ],
        '9' => &[&[(0.6, 0.5), (0.0, 0.5), (0.0, 0.0), (0.6, 0.0), (0.6, 1.0), (0.0, 1.0)]],
        'R' => &[
            &[(0.0, 1.0), (0.0, 0.0), (0.6, 0.0), (0.6, 0.5), (0.0, 0.5)],
            &[(0.25, 0.5), (0.6, 1.0)],
        ],
        _ => &[],
    }
}

/// Width of `text` laid out at `height`
pub fn text_width(text: &str, height: f32) -> f32 {
    let n = text.chars().count();
    if n == 0 {
        return 0.0;
    }
    ((n - 1) as f32 * ADVANCE + GLYPH_WIDTH) * height
}

/// Path of `text` centred on `center`; `None` if nothing is drawable
pub fn text_path(text: &str, center: Point, height: f32) -> Option<Path> {
    let left = center.x - text_width(text, height) / 2.0;
    let top = center.y - height / 2.0;

    let mut pb = PathBuilder::new();
    for (i, c) in text.chars().enumerate() {
        let origin_x = left + i as f32 * ADVANCE * height;
        for line in strokes(c) {
            let mut points = line.iter();
            let Some(&(x, y)) = points.next() else {
                continue;
            };
            pb.move_to(origin_x + x * height, top + y * height);
            for &(x, y) in points {
                pb.line_to(origin_x + x * height, top + y * height);
            }
        }
    }
    pb.finish()
}

/// Stroke style for glyphs of a given height
pub fn text_stroke(height: f32) -> Stroke {
    Stroke {
        width: (height * STROKE_RATIO).max(1.0),
        line_cap: LineCap::Square,
        line_join: LineJoin::Miter,
        ..Default::default()
    }
}
