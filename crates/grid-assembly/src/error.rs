//! Error types for grid assembly.

use thiserror::Error;

/// Errors that can occur while assembling an output dataset.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// A raw file's element count disagrees with the descriptor.
    #[error("raw grid holds {actual} elements, descriptor declares {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Calendar arguments violate ordering or epoch constraints.
    #[error("invalid calendar range: {0}")]
    InvalidRange(String),

    /// A requested spatial subset lies entirely outside the grid.
    #[error("requested {axis} range [{min}, {max}] is outside the grid span")]
    OutOfBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    /// A write disagrees with the declared dataset dimensions.
    #[error("shape {actual} disagrees with declared {expected}")]
    ShapeMismatch { expected: String, actual: String },

    /// Zarr metadata or codec error.
    #[error("Zarr error: {0}")]
    ZarrError(String),

    /// Storage or I/O error.
    #[error("storage error: {0}")]
    StorageError(String),
}

impl AssemblyError {
    /// Create an InvalidRange error.
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a ZarrError.
    pub fn zarr_error(msg: impl Into<String>) -> Self {
        Self::ZarrError(msg.into())
    }

    /// Create a StorageError.
    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }
}

impl From<std::io::Error> for AssemblyError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

/// Result type for grid assembly operations.
pub type Result<T> = std::result::Result<T, AssemblyError>;
