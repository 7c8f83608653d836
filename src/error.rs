//! Error types for the lesion-track library.

use thiserror::Error;

/// Result type for lesion-track operations.
pub type Result<T> = std::result::Result<T, LesionTrackError>;

/// Error types that can occur while associating or matching lesions.
#[derive(Error, Debug)]
pub enum LesionTrackError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Non-finite coordinates or negative area.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Malformed raw detection pass.
    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    /// Invalid distance threshold for matching.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Invalid tracker configuration.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed lesion-info document.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The same lesion id appears twice on one side of a match.
    #[error("Duplicate lesion id: {0}")]
    DuplicateLesionId(u32),
}
