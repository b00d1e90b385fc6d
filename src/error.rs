//! Error types for the viewer core.
//!
//! Nothing in here is fatal: every variant ends up as status-bar text and a
//! log line, and the session stays in its prior consistent state.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Image file could not be opened or decoded
    #[error("Could not load image {path:?}: {source}")]
    ImageLoad {
        /// Path that failed to decode
        path: PathBuf,
        /// Underlying codec error
        source: image::ImageError,
    },

    /// Annotation sidecar or playlist file could not be written
    #[error("Could not save data for {path:?}: {source}")]
    Persistence {
        /// Target file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Rendered image could not be written
    #[error("Could not save image {path:?}: {source}")]
    Export {
        /// Target file
        path: PathBuf,
        /// Underlying codec error
        source: image::ImageError,
    },

    /// I/O error outside of the cases above
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Calibration entry was not a positive number
    #[error("Invalid calibration '{0}': please enter a positive number")]
    InvalidCalibration(String),

    /// Opened file is not among the images found in its directory
    #[error("{0:?} is not in the playlist")]
    NotInPlaylist(PathBuf),

    /// Playlist has no entries to show
    #[error("Empty playlist")]
    EmptyPlaylist,

    /// Rename target already exists
    #[error("Filename already exists: {0:?}")]
    RenameCollision(PathBuf),

    /// New file name is empty or points into another directory
    #[error("Invalid file name '{0}'")]
    InvalidFileName(String),

    /// Crop selection does not overlap the image
    #[error("Crop selection is outside the image")]
    EmptyCrop,
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, ViewerError>;
