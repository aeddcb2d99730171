//! Writing finished screenshots to disk
//!
//! Each save produces `snap_YYYYMMDD_HHMMSS_mmm.png` and a JSON side file
//! with the same stem holding the title, description and marker records.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use image::RgbaImage;

use crate::config::SnapmarkConfig;
use crate::domain::ScreenshotMetadata;

/// Paths written by a save
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedScreenshot {
    pub png: PathBuf,
    pub metadata: PathBuf,
}

pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &SnapmarkConfig) -> Self {
        Self::new(config.screenshot_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File stem for a screenshot taken at `at`
    pub fn file_stem(at: DateTime<Local>) -> String {
        at.format("snap_%Y%m%d_%H%M%S_%3f").to_string()
    }

    /// Stem that does not clash with an existing PNG in the directory
    fn unique_stem(&self, at: DateTime<Local>) -> String {
        let base = Self::file_stem(at);
        let mut stem = base.clone();
        let mut n = 1;
        while self.dir.join(format!("{stem}.png")).exists() {
            stem = format!("{base}_{n}");
            n += 1;
        }
        stem
    }

    /// Write the flattened image and its metadata
    pub fn save(
        &self,
        image: &RgbaImage,
        metadata: &ScreenshotMetadata,
    ) -> anyhow::Result<SavedScreenshot> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let stem = self.unique_stem(Local::now());
        let png = self.dir.join(format!("{stem}.png"));
        let json = self.dir.join(format!("{stem}.json"));

        let file = File::create(&png).with_context(|| format!("Failed to create {}", png.display()))?;
        let file = encode_png(file, image)
            .with_context(|| format!("Failed to encode {}", png.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", png.display()))?;

        let text = serde_json::to_string_pretty(metadata)?;
        std::fs::write(&json, text).with_context(|| format!("Failed to write {}", json.display()))?;

        log::info!("Saved screenshot to {}", png.display());
        Ok(SavedScreenshot {
            png,
            metadata: json,
        })
    }
}

/// Encode through a buffer and hand back the flushed writer
fn encode_png<W: io::Write>(w: W, image: &RgbaImage) -> anyhow::Result<W> {
    let mut out = BufWriter::new(w);
    write_png(&mut out, image)?;
    out.into_inner()
        .map_err(|err| anyhow::Error::from(err.into_error()))
}

fn write_png<W: io::Write>(w: &mut W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()
}
