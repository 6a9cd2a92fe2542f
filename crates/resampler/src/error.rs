//! Error types for bitmap construction and filter parsing.

use std::fmt;

/// Error returned when a [`Bitmap`](crate::Bitmap) cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitmapError {
    /// Width or height is zero
    ZeroDimension {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
    /// Pixel buffer length does not equal `width * height * 4`
    LengthMismatch {
        /// Length implied by the dimensions
        expected: usize,
        /// Length of the buffer that was supplied
        actual: usize,
    },
    /// `width * height * 4` does not fit in `usize`
    TooLarge {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

impl fmt::Display for BitmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitmapError::ZeroDimension { width, height } => {
                write!(f, "bitmap dimensions must be non-zero, got {}x{}", width, height)
            }
            BitmapError::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "pixel buffer has {} bytes, expected {} (RGBA8)",
                    actual, expected
                )
            }
            BitmapError::TooLarge { width, height } => {
                write!(f, "bitmap {}x{} is too large to address", width, height)
            }
        }
    }
}

impl std::error::Error for BitmapError {}

/// Error returned when parsing an unknown filter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFilterError {
    name: String,
}

impl ParseFilterError {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// The name that failed to parse.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ParseFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown filter '{}' (expected nearest, bilinear, bicubic or lanczos)",
            self.name
        )
    }
}

impl std::error::Error for ParseFilterError {}
