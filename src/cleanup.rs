//! Duplicate-image cleanup.
//!
//! Trail cameras and manual copying leave byte-identical duplicates
//! scattered across a photo set. Files are compared by SHA-256 of their
//! contents; within each group of identical files the first one in
//! sorted path order is kept and the rest are removed (or just reported
//! in a dry run).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::TrailmarkError;
use crate::session::{find_images, ScanMode};

/// Hex SHA-256 of a file's contents, read in chunks.
pub fn file_sha256(path: &Path) -> Result<String, TrailmarkError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// A duplicate file and the earlier copy it duplicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateHit {
    /// The redundant copy.
    pub path: PathBuf,
    /// The copy that is kept.
    pub kept: PathBuf,
}

/// Finds byte-identical images under the given roots.
///
/// Within each group of duplicates, the lexicographically first path is
/// the kept one; the rest are reported as hits, in sorted order.
pub fn find_duplicates(roots: &[PathBuf]) -> Result<Vec<DuplicateHit>, TrailmarkError> {
    let images = find_images(roots, ScanMode::All)?;

    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut hits = Vec::new();
    for path in images {
        let digest = file_sha256(&path)?;
        match seen.get(&digest) {
            Some(kept) => hits.push(DuplicateHit {
                path,
                kept: kept.clone(),
            }),
            None => {
                seen.insert(digest, path);
            }
        }
    }
    Ok(hits)
}

/// Removes duplicate images under the given roots. With `dry_run` set,
/// nothing is deleted; the hits are only reported.
pub fn cleanup_images(roots: &[PathBuf], dry_run: bool) -> Result<Vec<DuplicateHit>, TrailmarkError> {
    let hits = find_duplicates(roots)?;
    if !dry_run {
        for hit in &hits {
            std::fs::remove_file(&hit.path)?;
        }
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn hashes_are_stable_and_content_addressed() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        let c = dir.path().join("c.jpg");
        fs::write(&a, b"same bytes").expect("write");
        fs::write(&b, b"same bytes").expect("write");
        fs::write(&c, b"other bytes").expect("write");

        assert_eq!(
            file_sha256(&a).expect("hash"),
            file_sha256(&b).expect("hash")
        );
        assert_ne!(
            file_sha256(&a).expect("hash"),
            file_sha256(&c).expect("hash")
        );
    }

    #[test]
    fn empty_file_hash_matches_known_digest() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let empty = dir.path().join("empty.jpg");
        fs::write(&empty, b"").expect("write");
        assert_eq!(
            file_sha256(&empty).expect("hash"),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn first_path_in_sort_order_is_kept() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("b.jpg"), b"dup").expect("write");
        fs::write(dir.path().join("a.jpg"), b"dup").expect("write");
        fs::write(dir.path().join("c.jpg"), b"unique").expect("write");

        let hits = find_duplicates(&[dir.path().to_path_buf()]).expect("find duplicates");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].path.ends_with("b.jpg"));
        assert!(hits[0].kept.ends_with("a.jpg"));
    }

    #[test]
    fn dry_run_leaves_files_alone() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"dup").expect("write");
        fs::write(&b, b"dup").expect("write");

        let hits = cleanup_images(&[dir.path().to_path_buf()], true).expect("dry run");
        assert_eq!(hits.len(), 1);
        assert!(a.exists());
        assert!(b.exists());
    }

    #[test]
    fn cleanup_removes_only_duplicates() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        let c = dir.path().join("c.jpg");
        fs::write(&a, b"dup").expect("write");
        fs::write(&b, b"dup").expect("write");
        fs::write(&c, b"unique").expect("write");

        let hits = cleanup_images(&[dir.path().to_path_buf()], false).expect("cleanup");
        assert_eq!(hits.len(), 1);
        assert!(a.exists());
        assert!(!b.exists());
        assert!(c.exists());
    }

    #[test]
    fn non_images_are_ignored() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("a.jpg"), b"dup").expect("write");
        fs::write(dir.path().join("notes.txt"), b"dup").expect("write");

        let hits = find_duplicates(&[dir.path().to_path_buf()]).expect("find duplicates");
        assert!(hits.is_empty());
    }
}
