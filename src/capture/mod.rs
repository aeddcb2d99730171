//! Base image acquisition
//!
//! Loading a screenshot from disk and cutting a dragged region out of a
//! full-screen grab.

pub mod image;
