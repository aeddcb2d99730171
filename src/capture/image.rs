//! Base images for an annotation session

use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::domain::Rect;

/// Regions narrower or shorter than this are treated as accidental clicks
pub const MIN_REGION_SIZE: i32 = 5;

/// Load any image format the `image` crate understands as RGBA
pub fn load_base_image(path: &Path) -> anyhow::Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_rgba8();
    log::debug!(
        "Base image loaded: {}x{} pixels from {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(img)
}

/// Crop the region dragged from `start` to `end` out of a full-screen image
///
/// The rectangle is normalized and clipped to the image; `None` if what is
/// left is under [`MIN_REGION_SIZE`] on either side.
pub fn crop_region(full: &RgbaImage, start: (i32, i32), end: (i32, i32)) -> Option<RgbaImage> {
    let bounds = Rect::new(
        0,
        0,
        i32::try_from(full.width()).ok()?,
        i32::try_from(full.height()).ok()?,
    );
    let rect = Rect::from_drag(start.0, start.1, end.0, end.1).intersect(bounds)?;
    if rect.width() < MIN_REGION_SIZE || rect.height() < MIN_REGION_SIZE {
        log::debug!("Region {}x{} too small, ignored", rect.width(), rect.height());
        return None;
    }
    let dim = rect.dimensions()?;
    Some(
        image::imageops::crop_imm(
            full,
            rect.left as u32,
            rect.top as u32,
            dim.width(),
            dim.height(),
        )
        .to_image(),
    )
}
