//! Serialized session summary handed to the storage layer

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use super::marker::{Marker, MarkerKind, MarkerShape};

/// Flat, storage-friendly record of one marker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerNote {
    pub id: String,
    pub kind: MarkerKind,
    /// Only set for pins
    pub number: Option<u32>,
    pub pos_x: f32,
    pub pos_y: f32,
    /// Arrow/redaction orientation; 0 for pins
    pub rotation_deg: f32,
    /// Arrow length; 0 for pins and redactions
    pub length: f32,
    /// Redaction size; 0 for arrows and pins
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub created_timestamp: String,
}

impl From<&Marker> for MarkerNote {
    fn from(marker: &Marker) -> Self {
        let (number, length, width, height) = match marker.shape {
            MarkerShape::Arrow { length } => (None, length, 0.0, 0.0),
            MarkerShape::Pin { number } => (Some(number), 0.0, 0.0, 0.0),
            MarkerShape::Redaction { width, height } => (None, 0.0, width, height),
        };
        Self {
            id: marker.id.to_string(),
            kind: marker.kind(),
            number,
            pos_x: marker.position.x,
            pos_y: marker.position.y,
            rotation_deg: marker.rotation_degrees,
            length,
            width,
            height,
            text: marker.note_text.clone(),
            created_timestamp: marker
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}

/// Title, description and marker list of a finished screenshot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotMetadata {
    pub title: String,
    pub description: String,
    pub markers: Vec<MarkerNote>,
}

impl ScreenshotMetadata {
    pub fn new(title: &str, description: &str, markers: Vec<MarkerNote>) -> Self {
        Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            markers,
        }
    }
}
