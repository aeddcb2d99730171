//! Marker rendering module
//!
//! This module contains:
//! - Geometry calculations shared between the canvas and the compositor
//! - Stroked vector glyphs for pin numbers and the redaction indicator
//! - Image rendering using tiny-skia (for saving to file)

pub mod geometry;
pub mod glyphs;
pub mod image;
