//! Marker bookkeeping
//!
//! This module provides the ordered marker store and the lookup maps that
//! tie each marker to its canvas item.

pub mod store;
