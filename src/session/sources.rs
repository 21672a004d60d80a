//! Discovery of images to label.
//!
//! Walks one or more roots recursively and keeps plain JPEG files,
//! filtered by whether a sidecar already exists. The result is sorted
//! and deduplicated so a queue built from overlapping roots is stable.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::naming::is_marked_deleted;
use crate::annot::has_sidecar;
use crate::error::TrailmarkError;

const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Which label state to select for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Images with no sidecar yet (normal labeling).
    #[default]
    Unlabeled,
    /// Images that already have a sidecar (edit/fixup mode).
    Labeled,
    /// Everything (edit mode over a mixed directory).
    All,
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let lower = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&lower.as_str())
        })
}

fn keep_file(path: &Path, mode: ScanMode) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if name.starts_with('.') || is_marked_deleted(name) {
        return false;
    }
    if !is_image_file(path) {
        return false;
    }

    match mode {
        ScanMode::All => true,
        ScanMode::Labeled => has_sidecar(path),
        ScanMode::Unlabeled => !has_sidecar(path),
    }
}

/// Finds images under the given roots, sorted and deduplicated.
pub fn find_images(roots: &[PathBuf], mode: ScanMode) -> Result<Vec<PathBuf>, TrailmarkError> {
    let mut found = BTreeSet::new();

    for root in roots {
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|err| {
                TrailmarkError::Io(err.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "walk error")
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if keep_file(entry.path(), mode) {
                found.insert(entry.path().to_path_buf());
            }
        }
    }

    Ok(found.into_iter().collect())
}
