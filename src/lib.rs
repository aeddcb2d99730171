//! Screenshot annotation: arrows, numbered pins and redactions placed on a
//! captured image, then flattened into a single raster with a metadata
//! record per marker.

pub mod annotations;
pub mod capture;
pub mod config;
pub mod domain;
pub mod render;
pub mod session;
pub mod storage;
pub mod widget;
