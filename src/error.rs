use std::path::PathBuf;
use thiserror::Error;

/// The main error type for trailmark operations.
#[derive(Debug, Error)]
pub enum TrailmarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse key map from {path}: {source}")]
    KeyMapParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse sidecar {path}: {source}")]
    SidecarParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write sidecar {path}: {source}")]
    SidecarWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YOLO label {path} line {line}: {message}")]
    YoloLabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to read image dimensions from {path}: {message}")]
    ImageRead { path: PathBuf, message: String },

    #[error("No class is bound to key '{0}'")]
    UnknownKey(String),
}
