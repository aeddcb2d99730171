//! Tool modes and cursor feedback for the annotation canvas

use serde::{Deserialize, Serialize};

/// Active tool; exactly one is selected at a time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Drag pans the view, clicks select and move markers
    #[default]
    Pan,
    /// Drag draws an arrow from the press point
    Arrow,
    /// Click drops the next numbered pin
    Pin,
    /// Drag draws a redaction rectangle
    Redact,
}

/// Cursor the host should display over the canvas
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorIcon {
    Arrow,
    OpenHand,
    ClosedHand,
    Crosshair,
}

/// Keys delivered to the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Return,
    /// Any key the session has no shortcut for
    Other,
}
