//! Pillar model of the cross-section evolution of bars in rolling passes
//!
//! The half cross-section of the workpiece is discretized into longitudinal pillars. Each
//! pillar carries its own width, height, and accumulated deformation. A roll pass is divided
//! into thin disk elements along the rolling direction, and the pillar state is propagated
//! from one disk element to the next. The pass-level spread correction reconciles the local
//! spread of each pillar with the global elongation of the profile.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod geometry;
pub mod numerics;
pub mod pass;
pub mod pillars;
pub mod prelude;
pub mod roll;
