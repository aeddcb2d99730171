//! Configuration persistence for snapmark settings

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::ToolMode;

/// Serializable colour, stored on disk as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MarkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl MarkColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, 255)
    }
}

impl TryFrom<String> for MarkColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #RRGGBB colour, got {value:?}"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("invalid hex digits in colour {value:?}"))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

impl From<MarkColor> for String {
    fn from(c: MarkColor) -> Self {
        c.to_string()
    }
}

impl fmt::Display for MarkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Colours used for markers on the canvas and in the flattened output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub arrow: MarkColor,
    pub pin_fill: MarkColor,
    pub pin_text: MarkColor,
    pub redaction_fill: MarkColor,
    pub redaction_indicator: MarkColor,
    pub selection_outline: MarkColor,
    pub handle_fill: MarkColor,
    pub rotation_handle: MarkColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            arrow: MarkColor::rgb(0xEF, 0x44, 0x44),
            pin_fill: MarkColor::rgb(0xFD, 0xE6, 0x8A),
            pin_text: MarkColor::rgb(0x11, 0x18, 0x27),
            redaction_fill: MarkColor::rgb(0x00, 0x00, 0x00),
            redaction_indicator: MarkColor::rgb(0x00, 0xFF, 0x00),
            selection_outline: MarkColor::rgb(0xFF, 0x00, 0x00),
            handle_fill: MarkColor::rgb(0xFF, 0xFF, 0xFF),
            rotation_handle: MarkColor::rgb(0x00, 0xFF, 0x00),
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapmarkConfig {
    /// Marker colours
    pub palette: Palette,
    /// Where screenshots are written (None = data dir default)
    pub save_dir: Option<PathBuf>,
    /// Tool selected when an annotation session opens
    pub initial_mode: ToolMode,
}

impl SnapmarkConfig {
    /// Directory name used under the platform config and data dirs
    pub const ID: &'static str = "snapmark";

    /// Path of the config file, if the platform has a config dir
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory on this platform, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("Could not determine config path for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }

    /// Directory screenshots are saved into
    pub fn screenshot_dir(&self) -> PathBuf {
        if let Some(dir) = &self.save_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::ID)
            .join("screenshots")
    }
}
