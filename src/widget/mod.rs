//! Interactive canvas and the visual items it holds

pub mod canvas;
pub mod items;
