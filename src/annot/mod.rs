//! Annotation geometry and persistence.
//!
//! The in-memory representation is always pixel-space XYXY boxes with an
//! optional label; the two sidecar formats (JSON and YOLO text) convert
//! to and from it at the filesystem boundary.

mod bbox;
mod coord;
mod model;
pub mod sidecar_json;
pub mod sidecar_yolo;

pub use bbox::BBox;
pub use coord::{Canvas, Coord, Normalized, Pixel};
pub use model::LabeledBox;

use std::path::{Path, PathBuf};

/// Sidecar formats a session can persist annotations in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SidecarFormat {
    #[default]
    Json,
    Yolo,
}

impl SidecarFormat {
    /// File extension used by this format.
    pub fn extension(&self) -> &'static str {
        match self {
            SidecarFormat::Json => "json",
            SidecarFormat::Yolo => "txt",
        }
    }
}

/// Finds the sidecar companion of an image, probing `.json` then `.txt`.
pub fn find_sidecar(image_path: &Path) -> Option<PathBuf> {
    for ext in ["json", "txt"] {
        let candidate = image_path.with_extension(ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Returns true if the image has a sidecar in either format.
pub fn has_sidecar(image_path: &Path) -> bool {
    find_sidecar(image_path).is_some()
}
