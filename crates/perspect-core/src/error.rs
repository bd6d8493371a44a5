//! Error types for geometry operations.

use thiserror::Error;

/// Error types for projective geometry operations.
///
/// Under normal operation none of these escape the session model: inputs are
/// clamped before they reach the matrix builder, and validation failures are
/// handled by reverting to the last known-good state. The variants exist so
/// that the low-level operations stay honest about the cases where the math
/// genuinely has no answer.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The projective matrix cannot be inverted.
    #[error("projective matrix is not invertible (determinant {0})")]
    DegenerateMatrix(f64),

    /// A point projected to infinity (homogeneous w near zero).
    #[error("point projected to infinity (w near zero)")]
    ProjectionAtInfinity,
}
