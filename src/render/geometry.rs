//! Shared geometry calculations for markers
//!
//! Constants and math used both by the interactive canvas and by the
//! compositor, so a marker looks identical in both places.

use crate::domain::Point;

/// Arrow geometry constants
pub mod arrow {
    use super::Point;

    /// Pen width for the shaft and head outline
    pub const THICKNESS: f32 = 3.0;
    /// Distance from the apex back to the head base
    pub const HEAD_LENGTH: f32 = 14.0;
    /// Half of the head base width
    pub const HEAD_HALF_WIDTH: f32 = 8.0;
    /// Arrows shorter than this are drawn as a bare line
    pub const MIN_HEADED_LENGTH: f32 = 6.0;
    /// Distance around the shaft that still counts as a hit
    pub const HIT_PAD: f32 = HEAD_HALF_WIDTH;
    /// Padding of the repaint bounds around the arrow
    pub const BOUNDS_PAD: f32 = 16.0;

    /// Outline of an arrow in its local frame (tail at origin, pointing +x)
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub enum ArrowOutline {
        /// Very short arrow: a single line from the origin
        Line { end: Point },
        /// Shaft from the origin to `shaft_end`, then a filled triangle
        Headed { shaft_end: Point, head: [Point; 3] },
    }

    /// Calculate the arrow outline for a given length
    pub fn outline(length: f32) -> ArrowOutline {
        let length = length.max(0.0);
        if length < MIN_HEADED_LENGTH {
            return ArrowOutline::Line {
                end: Point::new(length, 0.0),
            };
        }
        let head_base = (length - HEAD_LENGTH).max(0.0);
        ArrowOutline::Headed {
            shaft_end: Point::new(head_base, 0.0),
            head: [
                Point::new(length, 0.0),
                Point::new(head_base, -HEAD_HALF_WIDTH),
                Point::new(head_base, HEAD_HALF_WIDTH),
            ],
        }
    }
}

/// Pin geometry constants
pub mod pin {
    /// Circle radius
    pub const RADIUS: f32 = 14.0;
    /// Height of the number glyphs
    pub const TEXT_HEIGHT: f32 = 12.0;
}

/// Redaction geometry constants
pub mod redaction {
    /// Both sides must exceed this for a drawn rectangle to become a marker
    pub const MIN_CREATE_SIZE: f32 = 5.0;
    /// Smallest side a resize handle can shrink the rectangle to
    pub const MIN_RESIZE_SIZE: f32 = 10.0;
    /// Both sides must exceed this for the indicator glyph to be drawn
    pub const INDICATOR_MIN_SIZE: f32 = 16.0;
    /// Indicator glyph height bounds
    pub const INDICATOR_MIN_HEIGHT: f32 = 10.0;
    pub const INDICATOR_MAX_HEIGHT: f32 = 24.0;
    /// Corner and rotation handle side length
    pub const HANDLE_SIZE: f32 = 8.0;
    /// Distance of the rotation handle above the top edge (local space)
    pub const ROTATION_HANDLE_DISTANCE: f32 = 30.0;
    /// Selection outline pen width and dash pattern
    pub const OUTLINE_WIDTH: f32 = 2.0;
    pub const OUTLINE_DASH: [f32; 2] = [8.0, 4.0];

    /// Indicator glyph height for a rectangle, or `None` if it is too small
    pub fn indicator_height(width: f32, height: f32) -> Option<f32> {
        if width > INDICATOR_MIN_SIZE && height > INDICATOR_MIN_SIZE {
            Some(
                (width.min(height) / 3.0)
                    .floor()
                    .clamp(INDICATOR_MIN_HEIGHT, INDICATOR_MAX_HEIGHT),
            )
        } else {
            None
        }
    }
}

/// Rotation produced by a rotation-handle drag
///
/// `initial_rotation` and `initial_angle` are captured when the drag starts;
/// the result is relative to them so starting a drag never snaps the item.
/// A pointer sitting exactly on the centre gives no direction, in which case
/// `current_rotation` is kept.
pub fn drag_rotation(
    initial_rotation: f32,
    initial_angle: Option<f32>,
    center: Point,
    pointer: Point,
    current_rotation: f32,
) -> f32 {
    match (initial_angle, (pointer - center).angle_degrees()) {
        (Some(start), Some(now)) => initial_rotation + (now - start),
        _ => current_rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::arrow::{ArrowOutline, outline};
    use super::*;

    #[test]
    fn test_short_arrow_is_bare_line() {
        assert_eq!(
            outline(5.0),
            ArrowOutline::Line {
                end: Point::new(5.0, 0.0)
            }
        );
    }

    #[test]
    fn test_headed_arrow_geometry() {
        let ArrowOutline::Headed { shaft_end, head } = outline(20.0) else {
            panic!("expected a headed arrow");
        };
        assert_eq!(shaft_end, Point::new(6.0, 0.0));
        assert_eq!(head[0], Point::new(20.0, 0.0));
        assert_eq!(head[1], Point::new(6.0, -8.0));
        assert_eq!(head[2], Point::new(6.0, 8.0));
    }

    #[test]
    fn test_arrow_just_over_threshold_clamps_head_base() {
        let ArrowOutline::Headed { shaft_end, .. } = outline(10.0) else {
            panic!("expected a headed arrow");
        };
        assert_eq!(shaft_end, Point::ZERO);
    }

    #[test]
    fn test_indicator_height_bounds() {
        assert_eq!(redaction::indicator_height(16.0, 100.0), None);
        assert_eq!(redaction::indicator_height(17.0, 100.0), Some(10.0));
        assert_eq!(redaction::indicator_height(60.0, 45.0), Some(15.0));
        assert_eq!(redaction::indicator_height(300.0, 200.0), Some(24.0));
    }

    #[test]
    fn test_drag_rotation_is_relative() {
        let center = Point::new(0.0, 0.0);
        // Drag started pointing up (-90°) on an item already at 30°
        let r = drag_rotation(30.0, Some(-90.0), center, Point::new(10.0, 0.0), 30.0);
        assert!((r - 120.0).abs() < 1e-4);
    }

    #[test]
    fn test_drag_rotation_degenerate_pointer_keeps_rotation() {
        let center = Point::new(5.0, 5.0);
        assert_eq!(drag_rotation(0.0, Some(0.0), center, center, 42.0), 42.0);
        assert_eq!(drag_rotation(0.0, None, center, Point::new(9.0, 5.0), 42.0), 42.0);
    }
}
