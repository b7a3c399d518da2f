//! Implements the pillar discretization of cross-sections

mod discretizer;
mod pillar_set;
mod profile;
pub use crate::pillars::discretizer::*;
pub use crate::pillars::pillar_set::*;
pub use crate::pillars::profile::*;
