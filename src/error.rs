//! # Error Types
//!
//! This module defines error types used throughout the labelpress library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for labelpress operations
#[derive(Debug, Error)]
pub enum LabelError {
    /// Base image or unit label missing, unreadable or not a decodable raster
    #[error("Failed to load image {}: {reason}", path.display())]
    ImageLoad { path: PathBuf, reason: String },

    /// PNG encoding failed
    #[error("Image encoding error: {0}")]
    Encode(String),

    /// Output path could not be written
    #[error("Failed to write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    /// Requested composite sheet exceeds the pixel budget or available memory
    #[error("Sheet too large: {width}x{height} px")]
    SheetTooLarge { width: u32, height: u32 },

    /// Template or element data violates its invariants
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Request path escapes the asset directory
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// QR payload could not be decoded
    #[error("Invalid QR payload: {0}")]
    InvalidPayload(String),

    /// Font file could not be read or parsed
    #[error("Font error: {0}")]
    Font(String),

    /// HTTP server errors (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabelError {
    pub(crate) fn image_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LabelError::ImageLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LabelError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
