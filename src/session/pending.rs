//! The holding area for deferred hard deletes.
//!
//! A hard delete never removes anything immediately: the file is moved
//! into a private temp directory where it stays recoverable for as long
//! as its undo record lives. When the record is evicted from the undo
//! stack, the staged file is tracked here; tracked files are unlinked
//! when the session closes, and the temp directory itself goes with it.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Files staged for permanent deletion.
#[derive(Debug)]
pub struct PendingDeletions {
    staging: TempDir,
    tracked: BTreeSet<PathBuf>,
}

impl PendingDeletions {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            staging: TempDir::new()?,
            tracked: BTreeSet::new(),
        })
    }

    /// The directory hard-deleted files are staged into.
    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// Marks a staged file as no longer undoable.
    pub fn track(&mut self, path: PathBuf) {
        self.tracked.insert(path);
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Unlinks all tracked files. Missing files are fine (an undo may
    /// have moved one back out before its record was evicted).
    pub fn clear(&mut self) -> io::Result<()> {
        for path in std::mem::take(&mut self.tracked) {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Clears tracked files and removes the staging directory.
    pub fn finish(mut self) -> io::Result<()> {
        self.clear()?;
        self.staging.close()
    }
}
