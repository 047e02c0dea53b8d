use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdIndexError {
    /// A coordinate sequence did not have the dimension of the point type.
    #[error("Expected {expected} coordinates, got {actual}.")]
    DimensionMismatch {
        /// The dimension of the point type
        expected: usize,
        /// The number of coordinates provided
        actual: usize,
    },

    /// A coordinate could not be ordered against other coordinates (NaN).
    #[error("Coordinate on axis {axis} is not comparable.")]
    InvalidCoordinate {
        /// The offending axis
        axis: usize,
    },
}

pub type Result<T> = std::result::Result<T, KdIndexError>;
