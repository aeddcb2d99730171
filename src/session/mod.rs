//! Annotation session management module
//!
//! This module contains:
//! - The session that keeps canvas, marker store and note editor in sync
//! - Keyboard shortcuts
//! - The confirmation/information prompt seam
//! - Replay of scripted input

pub mod annotation;
pub mod prompt;
pub mod script;
pub mod shortcuts;
