//! Visual items placed on the annotation canvas
//!
//! Each marker kind has its own item type implementing [`Drawable`];
//! [`VisualItem`] dispatches over them. The same drawing code paints the
//! interactive canvas and the flattened output.

use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};

use crate::config::{MarkColor, Palette};
use crate::domain::{Bounds, Marker, MarkerKind, MarkerShape, MarkerSize, Point};
use crate::render::geometry::arrow::{self, ArrowOutline};
use crate::render::geometry::{pin, redaction};
use crate::render::glyphs;

/// Canvas-side handle of a visual item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// Placement of an item in the scene
///
/// `scene = pos + origin + R(rotation) * (local - origin)`, so rotation pivots
/// around `origin` (local coordinates).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemTransform {
    pub pos: Point,
    pub rotation: f32,
    pub origin: Point,
}

impl ItemTransform {
    pub fn at(pos: Point) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }

    pub fn map_to_scene(&self, local: Point) -> Point {
        self.pos + self.origin + (local - self.origin).rotated(self.rotation)
    }

    pub fn map_from_scene(&self, scene: Point) -> Point {
        self.origin + (scene - self.pos - self.origin).rotated(-self.rotation)
    }

    pub fn to_skia(&self) -> Transform {
        Transform::from_rotate_at(self.rotation, self.origin.x, self.origin.y)
            .post_translate(self.pos.x, self.pos.y)
    }

    /// Scene bounds of a local axis-aligned box
    fn scene_bounds(&self, local: Bounds) -> Bounds {
        let corners = [
            Point::new(local.min_x, local.min_y),
            Point::new(local.max_x, local.min_y),
            Point::new(local.max_x, local.max_y),
            Point::new(local.min_x, local.max_y),
        ];
        Bounds::enclosing(corners.map(|c| self.map_to_scene(c))).unwrap_or_default()
    }
}

/// Rendering and hit-testing capability shared by all marker items
pub trait Drawable {
    /// Whether a scene point lies on the item
    fn hit_test(&self, scene: Point) -> bool;
    /// Axis-aligned scene box covering everything the item paints
    fn bounding_box(&self) -> Bounds;
    /// Paint the item; `selected` adds interactive decorations
    fn render(&self, pixmap: &mut Pixmap, palette: &Palette, selected: bool);
}

fn solid(color: MarkColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn pen(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Square,
        line_join: LineJoin::Bevel,
        ..Default::default()
    }
}

/// Tail-anchored arrow; its rotation is the pointing direction
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowItem {
    pub transform: ItemTransform,
    pub length: f32,
}

impl ArrowItem {
    pub fn new(tail: Point) -> Self {
        Self {
            transform: ItemTransform::at(tail),
            length: 0.0,
        }
    }

    pub fn set_length(&mut self, length: f32) {
        self.length = length.max(0.0);
    }
}

impl Drawable for ArrowItem {
    fn hit_test(&self, scene: Point) -> bool {
        let local = self.transform.map_from_scene(scene);
        local.x >= -arrow::HIT_PAD
            && local.x <= self.length + arrow::HIT_PAD
            && local.y.abs() <= arrow::HIT_PAD
    }

    fn bounding_box(&self) -> Bounds {
        let pad = arrow::BOUNDS_PAD;
        self.transform.scene_bounds(Bounds {
            min_x: -pad,
            min_y: -pad,
            max_x: self.length + pad,
            max_y: pad,
        })
    }

    fn render(&self, pixmap: &mut Pixmap, palette: &Palette, _selected: bool) {
        let ts = self.transform.to_skia();
        let paint = solid(palette.arrow);
        let stroke = pen(arrow::THICKNESS);

        match arrow::outline(self.length) {
            ArrowOutline::Line { end } => {
                let mut pb = PathBuilder::new();
                pb.move_to(0.0, 0.0);
                pb.line_to(end.x, end.y);
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(&path, &paint, &stroke, ts, None);
                }
            }
            ArrowOutline::Headed { shaft_end, head } => {
                let mut pb = PathBuilder::new();
                pb.move_to(0.0, 0.0);
                pb.line_to(shaft_end.x, shaft_end.y);
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(&path, &paint, &stroke, ts, None);
                }

                let mut pb = PathBuilder::new();
                pb.move_to(head[0].x, head[0].y);
                pb.line_to(head[1].x, head[1].y);
                pb.line_to(head[2].x, head[2].y);
                pb.close();
                if let Some(path) = pb.finish() {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, ts, None);
                    pixmap.stroke_path(&path, &paint, &stroke, ts, None);
                }
            }
        }
    }
}

/// Numbered circle centred on its position
#[derive(Clone, Debug, PartialEq)]
pub struct PinItem {
    pub transform: ItemTransform,
    pub number: u32,
}

impl PinItem {
    pub fn new(center: Point, number: u32) -> Self {
        Self {
            transform: ItemTransform::at(center),
            number,
        }
    }
}

impl Drawable for PinItem {
    fn hit_test(&self, scene: Point) -> bool {
        self.transform.map_from_scene(scene).length() <= pin::RADIUS
    }

    fn bounding_box(&self) -> Bounds {
        let r = pin::RADIUS;
        self.transform.scene_bounds(Bounds {
            min_x: -r,
            min_y: -r,
            max_x: r,
            max_y: r,
        })
    }

    fn render(&self, pixmap: &mut Pixmap, palette: &Palette, _selected: bool) {
        let ts = self.transform.to_skia();
        if let Some(circle) = PathBuilder::from_circle(0.0, 0.0, pin::RADIUS) {
            pixmap.fill_path(&circle, &solid(palette.pin_fill), FillRule::Winding, ts, None);
        }
        let label = self.number.to_string();
        if let Some(text) = glyphs::text_path(&label, Point::ZERO, pin::TEXT_HEIGHT) {
            let stroke = glyphs::text_stroke(pin::TEXT_HEIGHT);
            pixmap.stroke_path(&text, &solid(palette.pin_text), &stroke, ts, None);
        }
    }
}

/// Corner of a redaction rectangle, in local (unrotated) space
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// How a local pointer delta changes (width, height) when dragging this corner
    fn growth(self) -> (f32, f32) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomRight => (1.0, 1.0),
            Corner::BottomLeft => (-1.0, 1.0),
        }
    }
}

/// Manipulation handle of a selected redaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedactHandle {
    Resize(Corner),
    Rotate,
}

/// Opaque rectangle rotating around its own centre
#[derive(Clone, Debug, PartialEq)]
pub struct RedactItem {
    pub transform: ItemTransform,
    pub width: f32,
    pub height: f32,
}

impl RedactItem {
    pub fn new(top_left: Point) -> Self {
        Self {
            transform: ItemTransform::at(top_left),
            width: 0.0,
            height: 0.0,
        }
    }

    /// Set the size and move the rotation origin to the new centre
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.transform.origin = self.center_local();
    }

    pub fn center_local(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn center_scene(&self) -> Point {
        self.transform.map_to_scene(self.center_local())
    }

    fn corner_local(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::ZERO,
            Corner::TopRight => Point::new(self.width, 0.0),
            Corner::BottomRight => Point::new(self.width, self.height),
            Corner::BottomLeft => Point::new(0.0, self.height),
        }
    }

    fn rotation_handle_local(&self) -> Point {
        Point::new(self.width / 2.0, -redaction::ROTATION_HANDLE_DISTANCE)
    }

    /// Handle under a scene point; the rotation handle wins over corners
    pub fn handle_at(&self, scene: Point) -> Option<RedactHandle> {
        let local = self.transform.map_from_scene(scene);
        let half = redaction::HANDLE_SIZE / 2.0;
        let near = |c: Point| (local.x - c.x).abs() <= half && (local.y - c.y).abs() <= half;

        if near(self.rotation_handle_local()) {
            return Some(RedactHandle::Rotate);
        }
        Corner::ALL
            .into_iter()
            .find(|&c| near(self.corner_local(c)))
            .map(RedactHandle::Resize)
    }

    /// Resize by dragging `corner` by a local-space delta
    ///
    /// The scene-space centre stays where it was, so the rectangle does not
    /// jump when it is rotated.
    pub fn resize_from(&mut self, corner: Corner, delta: Point) {
        let (gx, gy) = corner.growth();
        let old_center = self.center_local();
        let width = (self.width + gx * delta.x).max(redaction::MIN_RESIZE_SIZE);
        let height = (self.height + gy * delta.y).max(redaction::MIN_RESIZE_SIZE);
        self.set_size(width, height);
        let shift = old_center - self.center_local();
        self.transform.pos = self.transform.pos + shift;
    }

    fn local_bounds(&self) -> Bounds {
        Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: self.width,
            max_y: self.height,
        }
    }

    fn render_decorations(&self, pixmap: &mut Pixmap, palette: &Palette, ts: Transform) {
        let outline_paint = solid(palette.selection_outline);
        if let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, self.width, self.height) {
            let mut stroke = pen(redaction::OUTLINE_WIDTH);
            stroke.dash = StrokeDash::new(redaction::OUTLINE_DASH.to_vec(), 0.0);
            let path = PathBuilder::from_rect(rect);
            pixmap.stroke_path(&path, &outline_paint, &stroke, ts, None);
        }

        let size = redaction::HANDLE_SIZE;
        let handle_fill = solid(palette.handle_fill);
        for corner in Corner::ALL {
            let c = self.corner_local(corner);
            if let Some(rect) = tiny_skia::Rect::from_xywh(c.x - size / 2.0, c.y - size / 2.0, size, size)
            {
                let path = PathBuilder::from_rect(rect);
                pixmap.fill_path(&path, &handle_fill, FillRule::Winding, ts, None);
                pixmap.stroke_path(&path, &outline_paint, &pen(1.0), ts, None);
            }
        }

        let green = solid(palette.rotation_handle);
        let knob = self.rotation_handle_local();
        let mut pb = PathBuilder::new();
        pb.move_to(self.width / 2.0, 0.0);
        pb.line_to(knob.x, knob.y);
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &green, &pen(1.0), ts, None);
        }
        if let Some(circle) = PathBuilder::from_circle(knob.x, knob.y, size / 2.0) {
            pixmap.fill_path(&circle, &green, FillRule::Winding, ts, None);
            pixmap.stroke_path(&circle, &outline_paint, &pen(1.0), ts, None);
        }
    }
}

impl Drawable for RedactItem {
    fn hit_test(&self, scene: Point) -> bool {
        self.local_bounds()
            .contains(self.transform.map_from_scene(scene))
    }

    fn bounding_box(&self) -> Bounds {
        let pad = redaction::ROTATION_HANDLE_DISTANCE + redaction::HANDLE_SIZE;
        self.transform.scene_bounds(Bounds {
            min_x: -pad,
            min_y: -pad,
            max_x: self.width + pad,
            max_y: self.height + pad,
        })
    }

    fn render(&self, pixmap: &mut Pixmap, palette: &Palette, selected: bool) {
        let ts = self.transform.to_skia();
        if let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, self.width, self.height) {
            pixmap.fill_rect(rect, &solid(palette.redaction_fill), ts, None);
        }

        if selected {
            self.render_decorations(pixmap, palette, ts);
            return;
        }

        // Indicator keeps flattened redactions recognisable
        if let Some(height) = redaction::indicator_height(self.width, self.height)
            && let Some(glyph) = glyphs::text_path("R", self.center_local(), height)
        {
            let stroke = glyphs::text_stroke(height);
            pixmap.stroke_path(&glyph, &solid(palette.redaction_indicator), &stroke, ts, None);
        }
    }
}

/// Enum dispatch over the three item kinds
#[derive(Clone, Debug, PartialEq)]
pub enum VisualItem {
    Arrow(ArrowItem),
    Pin(PinItem),
    Redact(RedactItem),
}

impl VisualItem {
    /// Rebuild the item a stored marker describes
    pub fn from_marker(marker: &Marker) -> Self {
        match marker.shape {
            MarkerShape::Arrow { length } => {
                let mut item = ArrowItem::new(marker.position);
                item.set_length(length);
                item.transform.rotation = marker.rotation_degrees;
                VisualItem::Arrow(item)
            }
            MarkerShape::Pin { number } => VisualItem::Pin(PinItem::new(marker.position, number)),
            MarkerShape::Redaction { width, height } => {
                let mut item = RedactItem::new(marker.position);
                item.set_size(width, height);
                item.transform.rotation = marker.rotation_degrees;
                VisualItem::Redact(item)
            }
        }
    }

    pub fn kind(&self) -> MarkerKind {
        match self {
            VisualItem::Arrow(_) => MarkerKind::Arrow,
            VisualItem::Pin(_) => MarkerKind::Pin,
            VisualItem::Redact(_) => MarkerKind::Redaction,
        }
    }

    /// Marker shape describing the item's current geometry
    pub fn shape(&self) -> MarkerShape {
        match self {
            VisualItem::Arrow(a) => MarkerShape::Arrow { length: a.length },
            VisualItem::Pin(p) => MarkerShape::Pin { number: p.number },
            VisualItem::Redact(r) => MarkerShape::Redaction {
                width: r.width,
                height: r.height,
            },
        }
    }

    /// Live geometry as (position, rotation, size), the form the store syncs from
    pub fn geometry(&self) -> (Point, f32, MarkerSize) {
        let t = self.transform();
        let size = match self {
            VisualItem::Arrow(a) => MarkerSize::Length(a.length),
            VisualItem::Pin(_) => MarkerSize::None,
            VisualItem::Redact(r) => MarkerSize::Rect {
                width: r.width,
                height: r.height,
            },
        };
        (t.pos, t.rotation, size)
    }

    pub fn transform(&self) -> &ItemTransform {
        match self {
            VisualItem::Arrow(a) => &a.transform,
            VisualItem::Pin(p) => &p.transform,
            VisualItem::Redact(r) => &r.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut ItemTransform {
        match self {
            VisualItem::Arrow(a) => &mut a.transform,
            VisualItem::Pin(p) => &mut p.transform,
            VisualItem::Redact(r) => &mut r.transform,
        }
    }

    pub fn move_by(&mut self, delta: Point) {
        let t = self.transform_mut();
        t.pos = t.pos + delta;
    }
}

impl Drawable for VisualItem {
    fn hit_test(&self, scene: Point) -> bool {
        match self {
            VisualItem::Arrow(a) => a.hit_test(scene),
            VisualItem::Pin(p) => p.hit_test(scene),
            VisualItem::Redact(r) => r.hit_test(scene),
        }
    }

    fn bounding_box(&self) -> Bounds {
        match self {
            VisualItem::Arrow(a) => a.bounding_box(),
            VisualItem::Pin(p) => p.bounding_box(),
            VisualItem::Redact(r) => r.bounding_box(),
        }
    }

    fn render(&self, pixmap: &mut Pixmap, palette: &Palette, selected: bool) {
        match self {
            VisualItem::Arrow(a) => a.render(pixmap, palette, selected),
            VisualItem::Pin(p) => p.render(pixmap, palette, selected),
            VisualItem::Redact(r) => r.render(pixmap, palette, selected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn test_transform_round_trip_with_origin() {
        let t = ItemTransform {
            pos: Point::new(100.0, 50.0),
            rotation: 37.0,
            origin: Point::new(20.0, 10.0),
        };
        let local = Point::new(3.0, -7.0);
        assert!(approx(t.map_from_scene(t.map_to_scene(local)), local));
        // The origin itself is unaffected by rotation
        assert!(approx(t.map_to_scene(t.origin), Point::new(120.0, 60.0)));
    }

    #[test]
    fn test_skia_transform_matches_scene_mapping() {
        let t = ItemTransform {
            pos: Point::new(10.0, 20.0),
            rotation: 90.0,
            origin: Point::new(5.0, 5.0),
        };
        let mut pts = [tiny_skia::Point::from_xy(10.0, 0.0)];
        t.to_skia().map_points(&mut pts);
        let expected = t.map_to_scene(Point::new(10.0, 0.0));
        assert!(approx(Point::new(pts[0].x, pts[0].y), expected));
    }

    #[test]
    fn test_rotated_arrow_hit_test() {
        let mut arrow = ArrowItem::new(Point::new(0.0, 0.0));
        arrow.set_length(50.0);
        arrow.transform.rotation = 90.0;
        assert!(arrow.hit_test(Point::new(0.0, 40.0)));
        assert!(!arrow.hit_test(Point::new(40.0, 0.0)));
    }

    #[test]
    fn test_pin_hit_test_radius() {
        let pin = PinItem::new(Point::new(200.0, 200.0), 1);
        assert!(pin.hit_test(Point::new(210.0, 205.0)));
        assert!(!pin.hit_test(Point::new(215.0, 200.0)));
    }

    #[test]
    fn test_redact_resize_keeps_center_fixed_when_rotated() {
        let mut item = RedactItem::new(Point::new(100.0, 100.0));
        item.set_size(60.0, 40.0);
        item.transform.rotation = 30.0;
        let before = item.center_scene();

        item.resize_from(Corner::BottomRight, Point::new(20.0, 10.0));

        assert_eq!((item.width, item.height), (80.0, 50.0));
        assert!(approx(item.center_scene(), before));
    }

    #[test]
    fn test_redact_resize_enforces_minimum() {
        let mut item = RedactItem::new(Point::ZERO);
        item.set_size(30.0, 30.0);
        item.resize_from(Corner::TopLeft, Point::new(50.0, 50.0));
        assert_eq!((item.width, item.height), (10.0, 10.0));
    }

    #[test]
    fn test_redact_handles() {
        let mut item = RedactItem::new(Point::new(10.0, 10.0));
        item.set_size(40.0, 20.0);
        assert_eq!(
            item.handle_at(Point::new(30.0, -20.0)),
            Some(RedactHandle::Rotate)
        );
        assert_eq!(
            item.handle_at(Point::new(51.0, 29.0)),
            Some(RedactHandle::Resize(Corner::BottomRight))
        );
        assert_eq!(item.handle_at(Point::new(30.0, 20.0)), None);
    }

    #[test]
    fn test_from_marker_matches_live_geometry() {
        let mut item = RedactItem::new(Point::new(5.0, 6.0));
        item.set_size(30.0, 18.0);
        item.transform.rotation = -12.5;
        let live = VisualItem::Redact(item);

        let (pos, rotation, _) = live.geometry();
        let marker = Marker::new(
            crate::domain::MarkerId::from("m"),
            live.shape(),
            pos,
            rotation,
        );
        assert_eq!(VisualItem::from_marker(&marker), live);
    }
}
