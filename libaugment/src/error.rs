//! Error types for libaugment.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the augmentation pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// No input collection was handed to the occlusion generator.
    #[error("no images to augment")]
    NoImages,

    /// Failed to decode an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode or write an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The parameter combination leaves no valid range to sample from.
    #[error("invalid {axis} bounds for image {image}: cannot sample from [{low}, {high}]")]
    InvalidBounds {
        axis: Axis,
        image: usize,
        low: u32,
        high: u32,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Failed to parse a JSON run configuration.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to flatten a value into a trial record.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image axis an occlusion bound refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

impl Error {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for libaugment operations.
pub type Result<T> = std::result::Result<T, Error>;
