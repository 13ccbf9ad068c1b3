//! Error types for balogo-canvas2d.

use thiserror::Error;

/// Result type alias using Canvas2dError.
pub type Canvas2dResult<T> = Result<T, Canvas2dError>;

/// Errors that can occur in Canvas 2D operations.
#[derive(Debug, Error)]
pub enum Canvas2dError {
    /// Invalid canvas dimensions (must be positive and within limits).
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Failed to parse color value.
    #[error("Failed to parse color: {0}")]
    ColorParseError(String),

    /// Unknown globalCompositeOperation keyword.
    #[error("Unsupported composite operation: {0}")]
    CompositeParseError(String),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngError(String),

    /// PNG decoding error.
    #[error("PNG decoding error: {0}")]
    PngDecodeError(String),

    /// Raw pixel buffer does not match its declared size.
    #[error("Image data length {len} does not match {width}x{height} RGBA")]
    ImageDataLength { len: usize, width: u32, height: u32 },

    /// Text rendering error.
    #[error("Text rendering error: {0}")]
    TextError(String),
}

impl From<png::EncodingError> for Canvas2dError {
    fn from(err: png::EncodingError) -> Self {
        Canvas2dError::PngError(err.to_string())
    }
}

impl From<png::DecodingError> for Canvas2dError {
    fn from(err: png::DecodingError) -> Self {
        Canvas2dError::PngDecodeError(err.to_string())
    }
}
