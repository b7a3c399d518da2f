//! Implements the numerical collaborators (nonlinear root finder)

mod newton;
pub use crate::numerics::newton::*;
