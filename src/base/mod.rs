//! Implements the base structures of the pillar model

mod config;
mod constants;
mod enums;
mod error;
mod eval_cache;
mod sample_sections;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::enums::*;
pub use crate::base::error::*;
pub use crate::base::eval_cache::*;
pub use crate::base::sample_sections::*;
