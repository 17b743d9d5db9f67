//! Error types for curve construction.

use thiserror::Error;

/// Errors that can occur while building a curve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Polyline has fewer than two vertices.
    #[error("polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    /// Curve projects onto the reference plane with no length.
    #[error("curve has zero projected length")]
    ZeroLength,

    /// Arc radius is zero, negative or not finite.
    #[error("arc radius must be positive, got {0}")]
    InvalidRadius(f64),

    /// Arc sweeps no angle.
    #[error("arc sweep must be non-zero")]
    ZeroSweep,
}

/// Result type for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;
