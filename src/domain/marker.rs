//! Marker types placed on a screenshot
//!
//! All marker geometry is stored in scene coordinates, the coordinate system
//! shared by the base image and every marker.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// Opaque marker identifier, unique within a session
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    /// Build an id from the session counter and the creation time
    pub fn generate(counter: u64, at: DateTime<Local>) -> Self {
        Self(format!("marker_{}_{}", counter, at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MarkerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marker kind as it appears in stored metadata
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Arrow,
    Pin,
    #[serde(rename = "redact")]
    Redaction,
}

impl MarkerKind {
    /// Wire name used in metadata records
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerKind::Arrow => "arrow",
            MarkerKind::Pin => "pin",
            MarkerKind::Redaction => "redact",
        }
    }
}

/// Kind-specific geometry; exactly one variant is active per marker
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkerShape {
    /// Tail-anchored arrow pointing along its rotation
    Arrow { length: f32 },
    /// Numbered circle, numbers assigned in creation order starting at 1
    Pin { number: u32 },
    /// Opaque rectangle anchored at its unrotated top-left corner
    Redaction { width: f32, height: f32 },
}

impl MarkerShape {
    pub fn kind(&self) -> MarkerKind {
        match self {
            MarkerShape::Arrow { .. } => MarkerKind::Arrow,
            MarkerShape::Pin { .. } => MarkerKind::Pin,
            MarkerShape::Redaction { .. } => MarkerKind::Redaction,
        }
    }
}

/// Size component of a geometry update
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkerSize {
    /// Pins have no size
    None,
    Length(f32),
    Rect { width: f32, height: f32 },
}

/// A single user-placed annotation
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub shape: MarkerShape,
    /// Anchor point: arrow tail, pin centre, redaction top-left before rotation
    pub position: Point,
    /// Orientation in degrees, always 0 for pins
    pub rotation_degrees: f32,
    pub note_text: String,
    pub created_at: DateTime<Local>,
}

impl Marker {
    pub fn new(id: MarkerId, shape: MarkerShape, position: Point, rotation_degrees: f32) -> Self {
        let rotation_degrees = match shape {
            MarkerShape::Pin { .. } => 0.0,
            _ => rotation_degrees,
        };
        Self {
            id,
            shape,
            position,
            rotation_degrees,
            note_text: String::new(),
            created_at: Local::now(),
        }
    }

    pub fn kind(&self) -> MarkerKind {
        self.shape.kind()
    }

    pub fn pin_number(&self) -> Option<u32> {
        match self.shape {
            MarkerShape::Pin { number } => Some(number),
            _ => None,
        }
    }

    /// Human readable name shown in the marker list and prompts
    pub fn label(&self) -> String {
        match self.shape {
            MarkerShape::Arrow { .. } => "Arrow".to_string(),
            MarkerShape::Pin { number } => format!("Pin {number}"),
            MarkerShape::Redaction { .. } => "Redaction".to_string(),
        }
    }

    /// Apply synchronized geometry; a size of the wrong kind is ignored
    pub fn set_geometry(&mut self, position: Point, rotation_degrees: f32, size: MarkerSize) {
        self.position = position;
        match (&mut self.shape, size) {
            (MarkerShape::Arrow { length }, MarkerSize::Length(l)) => {
                *length = l.max(0.0);
                self.rotation_degrees = rotation_degrees;
            }
            (MarkerShape::Redaction { width, height }, MarkerSize::Rect { width: w, height: h }) => {
                *width = w.max(0.0);
                *height = h.max(0.0);
                self.rotation_degrees = rotation_degrees;
            }
            (MarkerShape::Pin { .. }, _) => {}
            (_, _) => self.rotation_degrees = rotation_degrees,
        }
    }
}
