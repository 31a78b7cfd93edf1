//! Error types for the mask-forge core.

use thiserror::Error;

/// Errors produced by mask operations.
///
/// Most recoverable conditions (mismatched operand sizes, empty bounding
/// boxes, out-of-range region indices) are handled locally and never surface
/// here. `InvalidConfiguration` is the one class of fatal, caller-visible
/// configuration error.
#[derive(Debug, Error)]
pub enum MaskError {
    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A data vector did not match the declared mask dimensions.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// An (x, y) coordinate was outside the mask bounds.
    #[error("index ({x}, {y}) out of bounds for mask of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A configuration field held an unrecognized or structurally invalid value.
    #[error("invalid configuration for '{field}': {value}")]
    InvalidConfiguration { field: String, value: String },

    /// Reading or writing a mask at the host boundary failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl MaskError {
    /// Shorthand for building an [`MaskError::InvalidConfiguration`].
    pub fn invalid(field: &str, value: impl ToString) -> Self {
        MaskError::InvalidConfiguration {
            field: field.to_owned(),
            value: value.to_string(),
        }
    }
}
