//! The labeling session engine.
//!
//! A [`LabelSession`] owns everything a frontend needs to drive labeling:
//! the image queue, the boxes on the current image, the keystroke
//! bindings, and two bounded undo stacks — one for box edits (cleared on
//! every image change) and one for file operations (save/skip/delete).
//! All filesystem effects happen here; the frontend only draws.
//!
//! Deletion is two-phase. Soft delete renames in place with the
//! `_DELETE__` marker. Hard delete moves the file into a private staging
//! directory where it remains undoable; it only becomes permanent when
//! the undo record is evicted from the file stack and the session closes.

pub mod naming;
pub mod pending;
pub mod sources;
pub mod undo;

pub use pending::PendingDeletions;
pub use sources::{find_images, ScanMode};
pub use undo::{
    BoxAction, FileAction, UndoStack, DEFAULT_BOX_UNDO_DEPTH, DEFAULT_FILE_UNDO_DEPTH,
};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::annot::{self, BBox, LabeledBox, Pixel, SidecarFormat};
use crate::config::{ClassRegistry, KeyMap};
use crate::error::TrailmarkError;
use naming::{strip_confidence_tags, strip_count_suffixes, DELETE_MARKER};

/// Moves a file, falling back to copy-and-remove across filesystems.
pub(crate) fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

/// Behavior knobs for a labeling session.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Fixup mode: committed images (and sidecars) land here under a
    /// normalized name instead of being saved in place.
    pub output_dir: Option<PathBuf>,
    /// In fixup mode, copy instead of moving the original.
    pub copy: bool,
    /// Delete permanently (staged) instead of soft-renaming.
    pub really_delete: bool,
    /// Sidecar format written on save.
    pub format: SidecarFormat,
    pub box_undo_depth: usize,
    pub file_undo_depth: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            copy: false,
            really_delete: false,
            format: SidecarFormat::Json,
            box_undo_depth: DEFAULT_BOX_UNDO_DEPTH,
            file_undo_depth: DEFAULT_FILE_UNDO_DEPTH,
        }
    }
}

/// An interactive labeling pass over a queue of images.
#[derive(Debug)]
pub struct LabelSession {
    queue: Vec<PathBuf>,
    current: usize,
    boxes: Vec<LabeledBox>,
    selected: Option<usize>,
    key_map: KeyMap,
    registry: ClassRegistry,
    options: SessionOptions,
    box_undo: UndoStack<BoxAction>,
    file_undo: UndoStack<FileAction>,
    pending: PendingDeletions,
    image_size: Option<(u32, u32)>,
}

impl LabelSession {
    /// Starts a session over the given images. The queue is sorted so
    /// runs over the same directory are deterministic.
    pub fn new(
        mut images: Vec<PathBuf>,
        key_map: KeyMap,
        options: SessionOptions,
    ) -> Result<Self, TrailmarkError> {
        images.sort();
        images.dedup();

        let registry = ClassRegistry::from_key_map(&key_map);
        let mut session = Self {
            queue: images,
            current: 0,
            boxes: Vec::new(),
            selected: None,
            key_map,
            registry,
            box_undo: UndoStack::new(options.box_undo_depth),
            file_undo: UndoStack::new(options.file_undo_depth),
            pending: PendingDeletions::new()?,
            options,
            image_size: None,
        };
        session.open_current()?;
        Ok(session)
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn current_image(&self) -> Option<&Path> {
        self.queue.get(self.current).map(PathBuf::as_path)
    }

    pub fn boxes(&self) -> &[LabeledBox] {
        &self.boxes
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Dimensions of the current image, once one is open.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn can_undo_box(&self) -> bool {
        !self.box_undo.is_empty()
    }

    pub fn can_undo_file(&self) -> bool {
        !self.file_undo.is_empty()
    }

    /// Files already past the point of undo, awaiting permanent removal.
    pub fn pending_deletion_count(&self) -> usize {
        self.pending.tracked_count()
    }

    /// Loads the image at the current queue position: box undo state is
    /// dropped, dimensions are read, and an existing sidecar (either
    /// format) is loaded.
    fn open_current(&mut self) -> Result<(), TrailmarkError> {
        self.box_undo.clear();
        self.boxes.clear();
        self.selected = None;
        self.image_size = None;

        let Some(path) = self.current_image().map(Path::to_path_buf) else {
            return Ok(());
        };

        let size = imagesize::size(&path).map_err(|err| TrailmarkError::ImageRead {
            path: path.clone(),
            message: err.to_string(),
        })?;
        let (width, height) = (size.width as u32, size.height as u32);
        self.image_size = Some((width, height));

        if let Some(sidecar) = annot::find_sidecar(&path) {
            self.boxes = match sidecar.extension().and_then(|e| e.to_str()) {
                Some("json") => annot::sidecar_json::read_json_sidecar(&sidecar)?,
                _ => annot::sidecar_yolo::read_yolo_sidecar(
                    &sidecar,
                    &self.registry,
                    width,
                    height,
                )?,
            };
        }
        Ok(())
    }

    /// Adds a freshly drawn box (unlabeled).
    ///
    /// Starting a new box while the previous one is still unlabeled
    /// discards the previous one first — the usual "drew it wrong, drew
    /// again" gesture. Degenerate boxes are rejected. Returns whether a
    /// box was added.
    pub fn add_box(&mut self, bbox: BBox<Pixel>) -> bool {
        if self.boxes.last().is_some_and(|b| !b.is_labeled()) {
            self.undo_box();
        }

        let Some((width, height)) = self.image_size else {
            return false;
        };
        let clamped = bbox.clamped(width as f64, height as f64);
        if clamped.is_degenerate() || !clamped.is_finite() {
            return false;
        }

        self.boxes.push(LabeledBox::unlabeled(clamped));
        self.box_undo.push(BoxAction::Add {
            index: self.boxes.len() - 1,
        });
        true
    }

    /// Assigns the class bound to `key` to the selected box, or to the
    /// most recent unlabeled box. The selection is consumed. Returns
    /// whether any box was labeled.
    pub fn assign_label(&mut self, key: &str) -> Result<bool, TrailmarkError> {
        let class = self
            .key_map
            .class_for(key)
            .ok_or_else(|| TrailmarkError::UnknownKey(key.to_string()))?
            .to_string();

        let target = match self.selected.take() {
            Some(index) => Some(index),
            None => self.boxes.iter().rposition(|b| !b.is_labeled()),
        };
        let Some(index) = target else {
            return Ok(false);
        };

        let previous = self.boxes[index].label.replace(class);
        self.box_undo.push(BoxAction::SetLabel { index, previous });
        Ok(true)
    }

    /// Deletes the selected box. Returns false when nothing is selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(index) = self.selected.take() else {
            return false;
        };
        let bbox = self.boxes.remove(index);
        self.box_undo.push(BoxAction::Delete { index, bbox });
        true
    }

    /// Moves the box selection by `delta`, wrapping around.
    pub fn cycle_selection(&mut self, delta: isize) {
        if self.boxes.is_empty() {
            self.selected = None;
            return;
        }
        let len = self.boxes.len() as isize;
        self.selected = Some(match self.selected {
            None if delta > 0 => 0,
            None => (len - 1) as usize,
            Some(index) => (index as isize + delta).rem_euclid(len) as usize,
        });
    }

    /// Moves through the queue by `delta`, wrapping around.
    pub fn navigate(&mut self, delta: isize) -> Result<(), TrailmarkError> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let len = self.queue.len() as isize;
        self.current = (self.current as isize + delta).rem_euclid(len) as usize;
        self.open_current()
    }

    /// Undoes the last box edit. Returns its description.
    pub fn undo_box(&mut self) -> Option<&'static str> {
        let action = self.box_undo.pop()?;
        let description = action.description();
        match action {
            BoxAction::Add { index } => {
                if index < self.boxes.len() {
                    self.boxes.remove(index);
                }
            }
            BoxAction::Delete { index, bbox } => {
                let at = index.min(self.boxes.len());
                self.boxes.insert(at, bbox);
            }
            BoxAction::SetLabel { index, previous } => {
                if let Some(b) = self.boxes.get_mut(index) {
                    b.label = previous;
                }
            }
        }
        if self.selected.is_some_and(|s| s >= self.boxes.len()) {
            self.selected = None;
        }
        Some(description)
    }

    /// Undoes the last file operation, moving files back and reinserting
    /// the path at the current queue position.
    pub fn undo_file(&mut self) -> Result<Option<&'static str>, TrailmarkError> {
        let Some(action) = self.file_undo.pop() else {
            return Ok(None);
        };
        let description = action.description();
        match action {
            FileAction::Save { source, dest } => {
                move_file(&dest, &source)?;
                self.reinsert(source)?;
            }
            FileAction::Skip { source } => {
                self.reinsert(source)?;
            }
            FileAction::Delete {
                original,
                staged,
                original_sidecar,
                staged_sidecar,
                ..
            } => {
                move_file(&staged, &original)?;
                if let (Some(from), Some(to)) = (staged_sidecar, original_sidecar) {
                    move_file(&from, &to)?;
                }
                self.reinsert(original)?;
            }
        }
        Ok(Some(description))
    }

    /// Undoes the most recent action: box edits first, file operations
    /// once the box stack is empty (the Backspace behavior).
    pub fn undo(&mut self) -> Result<Option<&'static str>, TrailmarkError> {
        if !self.box_undo.is_empty() {
            return Ok(self.undo_box());
        }
        self.undo_file()
    }

    fn reinsert(&mut self, path: PathBuf) -> Result<(), TrailmarkError> {
        let at = self.current.min(self.queue.len());
        self.queue.insert(at, path);
        self.current = at;
        self.open_current()
    }

    fn register_file_action(&mut self, action: FileAction) {
        if let Some(evicted) = self.file_undo.push(action) {
            self.finalize(evicted);
        }
    }

    /// An evicted record can no longer be undone. Hard deletes hand
    /// their staged files over for permanent removal; everything else
    /// needs no finalization.
    fn finalize(&mut self, action: FileAction) {
        if let FileAction::Delete {
            staged,
            staged_sidecar,
            hard: true,
            ..
        } = action
        {
            self.pending.track(staged);
            if let Some(sidecar) = staged_sidecar {
                self.pending.track(sidecar);
            }
        }
    }

    fn write_sidecar(&self, image_path: &Path) -> Result<PathBuf, TrailmarkError> {
        let path = image_path.with_extension(self.options.format.extension());
        match self.options.format {
            SidecarFormat::Json => annot::sidecar_json::write_json_sidecar(&path, &self.boxes)?,
            SidecarFormat::Yolo => {
                let (width, height) =
                    self.image_size.ok_or_else(|| TrailmarkError::ImageRead {
                        path: image_path.to_path_buf(),
                        message: "image dimensions unavailable".to_string(),
                    })?;
                annot::sidecar_yolo::write_yolo_sidecar(
                    &path,
                    &self.boxes,
                    &self.registry,
                    width,
                    height,
                )?;
            }
        }
        Ok(path)
    }

    /// Persists the current boxes and advances to the next image.
    ///
    /// In fixup mode the image is moved (or copied) into the output
    /// directory under a normalized name — count suffixes and
    /// confidence tags stripped — and the move is undoable. Otherwise
    /// the sidecar is written next to the source in place.
    ///
    /// Returns the sidecar path written, or `None` on an empty queue.
    pub fn save_and_next(&mut self) -> Result<Option<PathBuf>, TrailmarkError> {
        if self.queue.is_empty() {
            return Ok(None);
        }
        let source = self.queue.remove(self.current);

        let sidecar = if let Some(out_dir) = self.options.output_dir.clone() {
            fs::create_dir_all(&out_dir)?;

            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let clean =
                strip_confidence_tags(&strip_count_suffixes(&file_name), self.registry.names());
            let dest = out_dir.join(clean);

            if self.options.copy {
                fs::copy(&source, &dest)?;
            } else {
                move_file(&source, &dest)?;
            }
            self.register_file_action(FileAction::Save {
                source,
                dest: dest.clone(),
            });
            self.write_sidecar(&dest)?
        } else {
            self.write_sidecar(&source)?
        };

        self.advance_after_removal()?;
        Ok(Some(sidecar))
    }

    /// Drops the current image from the queue without touching it.
    pub fn skip_and_next(&mut self) -> Result<(), TrailmarkError> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let source = self.queue.remove(self.current);
        self.register_file_action(FileAction::Skip { source });
        self.advance_after_removal()
    }

    /// Deletes the current image (and its sidecar, if any): soft rename
    /// with the `_DELETE__` marker, or staging for hard deletion when
    /// `really_delete` is set.
    pub fn delete_current(&mut self) -> Result<(), TrailmarkError> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let image = self.queue.remove(self.current);
        let sidecar = annot::find_sidecar(&image);

        let file_name = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        let action = if self.options.really_delete {
            let staged = self.pending.staging_dir().join(file_name(&image));
            move_file(&image, &staged)?;

            let staged_sidecar = match &sidecar {
                Some(sc) => {
                    let staged_sc = self.pending.staging_dir().join(file_name(sc));
                    move_file(sc, &staged_sc)?;
                    Some(staged_sc)
                }
                None => None,
            };
            FileAction::Delete {
                original: image,
                staged,
                original_sidecar: sidecar,
                staged_sidecar,
                hard: true,
            }
        } else {
            let staged = image.with_file_name(format!("{DELETE_MARKER}{}", file_name(&image)));
            move_file(&image, &staged)?;

            let staged_sidecar = match &sidecar {
                Some(sc) => {
                    let staged_sc = sc.with_file_name(format!("{DELETE_MARKER}{}", file_name(sc)));
                    move_file(sc, &staged_sc)?;
                    Some(staged_sc)
                }
                None => None,
            };
            FileAction::Delete {
                original: image,
                staged,
                original_sidecar: sidecar,
                staged_sidecar,
                hard: false,
            }
        };

        self.register_file_action(action);
        self.advance_after_removal()
    }

    fn advance_after_removal(&mut self) -> Result<(), TrailmarkError> {
        if !self.queue.is_empty() && self.current >= self.queue.len() {
            self.current = self.queue.len() - 1;
        }
        self.open_current()
    }

    /// Ends the session: tracked pending deletions are unlinked and the
    /// staging directory is removed. This is the point where hard
    /// deletes become permanent.
    pub fn close(mut self) -> Result<(), TrailmarkError> {
        self.file_undo.clear();
        self.pending.finish()?;
        Ok(())
    }
}
