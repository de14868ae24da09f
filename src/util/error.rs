//! Error types for detdecode.

use thiserror::Error;

/// Result alias for detdecode operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur when building tensor views or decoding them.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The attribute count of the tensor disagrees with `5 + num_classes`.
    #[error("shape mismatch: expected {expected} attributes per prediction, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    /// Thresholds, class indices or output space are out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// A tensor dimension is zero.
    #[error("invalid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    /// The flat buffer does not hold exactly the declared number of elements.
    #[error("buffer size mismatch: shape needs {needed} elements, got {got}")]
    BufferSizeMismatch { needed: usize, got: usize },
    /// The shape is not `[rows, cols]` or `[1, rows, cols]`.
    #[error("unsupported tensor rank {rank} (batch {batch})")]
    UnsupportedRank { rank: usize, batch: usize },
}
