//! Implements the roll pass with disk elements and the spread correction

mod control;
mod disk_element;
mod results;
mod roll_pass;
mod totals;
pub use crate::pass::control::*;
pub use crate::pass::disk_element::*;
pub use crate::pass::results::*;
pub use crate::pass::roll_pass::*;
pub use crate::pass::totals::*;
