//! Implements the roll collaborators (roll contour and spread laws)

mod contour;
mod spread;
pub use crate::roll::contour::*;
pub use crate::roll::spread::*;
