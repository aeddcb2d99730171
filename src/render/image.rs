//! Image rendering for markers using tiny-skia
//!
//! These functions flatten markers onto an RgbaImage for saving to disk.

use image::RgbaImage;
use tiny_skia::{ColorU8, Pixmap, PremultipliedColorU8};

use crate::config::Palette;
use crate::domain::Marker;
use crate::widget::items::{Drawable, VisualItem};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
///
/// RgbaImage holds straight alpha while tiny-skia blends premultiplied
/// pixels, so both directions convert. Pixels the drawing left alone keep
/// their original bytes.
pub fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let premultiplied: Vec<PremultipliedColorU8> = img
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            ColorU8::from_rgba(r, g, b, a).premultiply()
        })
        .collect();
    let data = premultiplied
        .iter()
        .flat_map(|c| [c.red(), c.green(), c.blue(), c.alpha()])
        .collect();
    let Some(mut pixmap) = Pixmap::from_vec(data, size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    for ((dst, before), after) in img.pixels_mut().zip(&premultiplied).zip(pixmap.pixels()) {
        if before != after {
            let c = after.demultiply();
            dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
        }
    }
}

/// Draw the base image and every marker on top, in the given order
///
/// Later markers occlude earlier ones. Markers are drawn exactly like their
/// unselected canvas items, from their stored geometry. Rotated redactions
/// therefore pivot on their centre as they do on the canvas, not on the
/// stored top-left corner; the stored position is the unrotated corner.
pub fn flatten<'a>(
    base: &RgbaImage,
    markers: impl IntoIterator<Item = &'a Marker>,
    palette: &Palette,
) -> RgbaImage {
    let mut img = base.clone();
    let items: Vec<VisualItem> = markers.into_iter().map(VisualItem::from_marker).collect();
    if items.is_empty() {
        return img;
    }

    with_pixmap(&mut img, |pixmap| {
        for item in &items {
            item.render(pixmap, palette, false);
        }
    });
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarkerId, MarkerShape, Point};
    use image::Rgba;

    fn gray_base() -> RgbaImage {
        RgbaImage::from_pixel(120, 80, Rgba([128, 128, 128, 255]))
    }

    fn marker(id: &str, shape: MarkerShape, x: f32, y: f32, rotation: f32) -> Marker {
        Marker::new(MarkerId::from(id), shape, Point::new(x, y), rotation)
    }

    #[test]
    fn test_flatten_without_markers_is_pixel_identical() {
        let base = gray_base();
        let out = flatten(&base, std::iter::empty(), &Palette::default());
        assert_eq!(out, base);
    }

    #[test]
    fn test_later_marker_drawn_on_top() {
        let base = gray_base();
        let palette = Palette::default();
        let redaction = marker(
            "a",
            MarkerShape::Redaction {
                width: 10.0,
                height: 10.0,
            },
            20.0,
            20.0,
            0.0,
        );
        let pin = marker("b", MarkerShape::Pin { number: 1 }, 25.0, 25.0, 0.0);

        let out = flatten(&base, [&redaction, &pin], &palette);
        // Overlap corner, clear of the pin's number glyph
        assert_eq!(out.get_pixel(20, 20).0, palette.pin_fill.to_rgba_u8());

        let out = flatten(&base, [&pin, &redaction], &palette);
        assert_eq!(out.get_pixel(20, 20).0, palette.redaction_fill.to_rgba_u8());
    }

    #[test]
    fn test_redaction_indicator_only_on_large_rectangles() {
        let base = gray_base();
        let palette = Palette::default();
        let big = marker(
            "big",
            MarkerShape::Redaction {
                width: 60.0,
                height: 60.0,
            },
            0.0,
            0.0,
            0.0,
        );
        let out = flatten(&base, [&big], &palette);
        // Left stem of the "R" runs through x = 30 - 20 * 0.3 = 24.0
        let indicator = palette.redaction_indicator.to_rgba_u8();
        assert!((25..35).any(|y| out.get_pixel(24, y).0 == indicator));

        let small = marker(
            "small",
            MarkerShape::Redaction {
                width: 16.0,
                height: 60.0,
            },
            0.0,
            0.0,
            0.0,
        );
        let out = flatten(&base, [&small], &palette);
        assert!(out.pixels().all(|p| p.0 != indicator));
    }

    #[test]
    fn test_rotated_redaction_pivots_on_centre() {
        let base = gray_base();
        let palette = Palette::default();
        // 40x10 bar centred on (60, 40), turned upright
        let bar = marker(
            "bar",
            MarkerShape::Redaction {
                width: 40.0,
                height: 10.0,
            },
            40.0,
            35.0,
            90.0,
        );
        let out = flatten(&base, [&bar], &palette);
        let black = palette.redaction_fill.to_rgba_u8();
        assert_eq!(out.get_pixel(60, 25).0, black);
        assert_eq!(out.get_pixel(60, 55).0, black);
        assert_ne!(out.get_pixel(45, 40).0, black);
    }

    #[test]
    fn test_arrow_head_reaches_tip() {
        let base = gray_base();
        let palette = Palette::default();
        let arrow = marker("arrow", MarkerShape::Arrow { length: 40.0 }, 10.0, 40.0, 0.0);
        let out = flatten(&base, [&arrow], &palette);
        let red = palette.arrow.to_rgba_u8();
        // Shaft, head body and the area near the apex
        assert_eq!(out.get_pixel(15, 40).0, red);
        assert_eq!(out.get_pixel(40, 38).0, red);
        assert_eq!(out.get_pixel(46, 40).0, red);
        assert_ne!(out.get_pixel(20, 33).0, red);
    }

    #[test]
    fn test_short_arrow_has_no_head() {
        let base = gray_base();
        let palette = Palette::default();
        let arrow = marker("arrow", MarkerShape::Arrow { length: 5.0 }, 10.0, 40.0, 0.0);
        let out = flatten(&base, [&arrow], &palette);
        assert_eq!(out.get_pixel(12, 40).0, palette.arrow.to_rgba_u8());
        // Square caps reach 1.5 past each end of the 3 px line
        for (x, y, p) in out.enumerate_pixels() {
            if !(8..=16).contains(&x) || !(38..=41).contains(&y) {
                assert_eq!(p, base.get_pixel(x, y), "painted at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_translucent_base_blends_in_straight_alpha() {
        let base = RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 128]));
        let palette = Palette::default();
        // Left edge at x = 10.5 half covers column 10
        let redaction = marker(
            "half",
            MarkerShape::Redaction {
                width: 10.0,
                height: 10.0,
            },
            10.5,
            10.0,
            0.0,
        );
        let out = flatten(&base, [&redaction], &palette);

        let [r, g, b, a] = out.get_pixel(10, 15).0;
        assert!((189..=193).contains(&a), "alpha {a}");
        for c in [r, g, b] {
            assert!((82..=88).contains(&c), "channel {c}");
        }
        assert_eq!(out.get_pixel(15, 15).0, palette.redaction_fill.to_rgba_u8());
        assert_eq!(out.get_pixel(30, 30).0, [255, 255, 255, 128]);
    }
}
