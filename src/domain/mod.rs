//! Pure domain types with minimal dependencies
//!
//! Types here carry no rendering or interaction logic so every other module
//! can depend on them without cycles.

pub mod geometry;
pub mod marker;
pub mod metadata;
pub mod mode;

pub use geometry::*;
pub use marker::*;
pub use metadata::*;
pub use mode::*;
