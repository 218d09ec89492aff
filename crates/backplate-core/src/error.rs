//! Error types for backplate-rs.

use thiserror::Error;

use crate::frame::ColorFormat;

/// The main error type for backplate-rs operations.
#[derive(Error, Debug)]
pub enum BackplateError {
    /// A required texture dimension exceeds the supported ceiling.
    #[error("camera image needs a {required}px texture dimension (maximum {max})")]
    TextureTooLarge { required: u32, max: u32 },

    /// Pixel data length does not match the declared frame dimensions.
    #[error("pixel data size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The format has no fixed interleaved pixel size.
    #[error("color format {0:?} has no fixed pixel size")]
    UnsizedFormat(ColorFormat),

    /// Rendering error reported by the backend.
    #[error("render error: {0}")]
    RenderError(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for backplate-rs operations.
pub type Result<T> = std::result::Result<T, BackplateError>;
