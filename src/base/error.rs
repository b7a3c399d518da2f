use crate::StrError;
use thiserror::Error;

/// Holds the errors raised by the pillar model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The pillar discretization failed (e.g., the uniform-area solve did not converge)
    #[error("discretization failed: {0}")]
    Discretization(String),

    /// A zero or near-zero height or width was found where a nonzero value is required
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The configuration holds inconsistent values
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The spread-correction loop exceeded its iteration budget
    #[error("no convergence: {0}")]
    Convergence(String),

    /// A polygon is invalid (too few points, zero area, or self-intersecting)
    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    /// The nonlinear root finder failed
    #[error("solver failed: {0}")]
    Solver(String),

    /// The input data is inconsistent
    #[error("{0}")]
    Input(StrError),

    /// Reading or writing a file failed
    #[error("i/o failed: {0}")]
    Io(String),
}

impl From<StrError> for Error {
    fn from(message: StrError) -> Self {
        Error::Input(message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Io(err.to_string())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
