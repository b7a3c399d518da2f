//! Implements the polygon geometry of cross-sections

mod polygon;
mod reconstruct;
pub use crate::geometry::polygon::*;
pub use crate::geometry::reconstruct::*;
