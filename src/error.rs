use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Invalid image format: {reason}")]
    InvalidImageFormat { reason: String },

    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to export {path}: {reason}")]
    Export { path: PathBuf, reason: String },

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl DetectionError {
    pub(crate) fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidImageFormat {
            reason: reason.into(),
        }
    }

    /// True for errors that mean "this input is not a usable RGB raster".
    pub fn is_invalid_image(&self) -> bool {
        matches!(self, Self::InvalidImageFormat { .. } | Self::Decode { .. })
    }
}

pub type Result<T> = std::result::Result<T, DetectionError>;
