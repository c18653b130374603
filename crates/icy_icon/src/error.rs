//! Unified error types for icy_icon

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for icon container operations
#[derive(Debug, Error)]
pub enum IconError {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open '{path}' for writing: {message}")]
    DestinationUnwritable { path: PathBuf, message: String },

    // === Layer Errors ===
    #[error("Layer buffer for {scale}x{scale} must hold {expected} bytes, got {actual}")]
    LayerSizeMismatch { scale: u32, expected: usize, actual: usize },

    #[error("Layer image must be square, got {width}x{height}")]
    LayerNotSquare { width: u32, height: u32 },

    #[error("Layer scale {scale} out of range ({min}..={max})")]
    ScaleOutOfRange { scale: u32, min: u32, max: u32 },

    #[error("Layer {scale}x{scale} appears more than once in the export set")]
    DuplicateScale { scale: u32 },

    #[error("Too many layers for one container: {count} (max {max})")]
    TooManyLayers { count: usize, max: usize },

    // === Loading Errors ===
    #[error("File too short to be valid")]
    FileTooShort,

    #[error("Invalid file ID or magic number mismatch")]
    IdMismatch,

    #[error("Data out of bounds at offset {offset}")]
    OutOfBounds { offset: usize },

    #[error("Unsupported bitmap payload: {message}")]
    UnsupportedBitmap { message: String },

    // === icns Errors ===
    #[error("No icns element type for a {scale}px layer (double density: {retina})")]
    UnknownIcnsScale { scale: u32, retina: bool },

    // === Codec Errors ===
    #[error("Invalid PNG data: {message}")]
    InvalidPng { message: String },

    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    PngDecoding(#[from] png::DecodingError),
}

/// Result type alias for icon container operations
pub type Result<T> = std::result::Result<T, IconError>;

// === Convenience constructors ===
impl IconError {
    /// Create a destination-unwritable error from any displayable cause
    pub fn destination_unwritable(path: impl Into<PathBuf>, msg: impl std::fmt::Display) -> Self {
        Self::DestinationUnwritable {
            path: path.into(),
            message: msg.to_string(),
        }
    }

    /// Create an invalid-PNG error
    pub fn invalid_png(msg: impl Into<String>) -> Self {
        Self::InvalidPng { message: msg.into() }
    }
}
