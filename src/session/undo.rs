//! Bounded undo stacks for the labeling session.
//!
//! Every user-visible mutation is captured as a reversible record. Two
//! independent stacks exist: one for box edits on the current image
//! (cleared whenever the image changes) and one for file operations
//! (save/skip/delete), which survives across images. Both are bounded;
//! pushing onto a full stack evicts the oldest record, and the session
//! finalizes evicted records (which is how deferred hard deletes become
//! permanent).

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::annot::LabeledBox;

/// Default depth of the box-edit undo stack.
pub const DEFAULT_BOX_UNDO_DEPTH: usize = 20;
/// Default depth of the file-operation undo stack.
pub const DEFAULT_FILE_UNDO_DEPTH: usize = 16;

/// A fixed-capacity LIFO of undo records.
///
/// `push` returns the evicted oldest record when the stack is full so
/// the caller can finalize it.
#[derive(Clone, Debug)]
pub struct UndoStack<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> UndoStack<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Pushes a record, evicting and returning the oldest one when full.
    pub fn push(&mut self, record: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(record);
        evicted
    }

    /// Pops the most recent record.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A reversible edit to the current image's box list.
///
/// Records hold indices into the box list. That is sound because undo is
/// strictly LIFO: popping a record always restores the exact list state
/// the next record down was created against.
#[derive(Clone, Debug, PartialEq)]
pub enum BoxAction {
    /// A box was appended at `index`.
    Add { index: usize },
    /// The box `bbox` was removed from `index`.
    Delete { index: usize, bbox: LabeledBox },
    /// The box at `index` had its label changed from `previous`.
    SetLabel {
        index: usize,
        previous: Option<String>,
    },
}

impl BoxAction {
    pub fn description(&self) -> &'static str {
        match self {
            BoxAction::Add { .. } => "add bounding box",
            BoxAction::Delete { .. } => "delete bounding box",
            BoxAction::SetLabel { .. } => "add label",
        }
    }
}

/// A reversible file operation.
#[derive(Clone, Debug, PartialEq)]
pub enum FileAction {
    /// The image was moved (or copied) from `source` to `dest` on save.
    Save { source: PathBuf, dest: PathBuf },
    /// The image was dropped from the queue without modification.
    Skip { source: PathBuf },
    /// The image (and its sidecar, if any) was soft-renamed or staged
    /// for hard deletion.
    Delete {
        original: PathBuf,
        staged: PathBuf,
        original_sidecar: Option<PathBuf>,
        staged_sidecar: Option<PathBuf>,
        hard: bool,
    },
}

impl FileAction {
    pub fn description(&self) -> &'static str {
        match self {
            FileAction::Save { .. } => "save file",
            FileAction::Skip { .. } => "skip file",
            FileAction::Delete { hard: false, .. } => "soft delete file",
            FileAction::Delete { hard: true, .. } => "hard delete file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_pop_are_lifo() {
        let mut stack = UndoStack::new(8);
        assert!(stack.push(1).is_none());
        assert!(stack.push(2).is_none());
        assert_eq!(stack.len(), 2);

        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn full_stack_evicts_oldest() {
        let mut stack = UndoStack::new(2);
        assert!(stack.push(1).is_none());
        assert!(stack.push(2).is_none());
        assert_eq!(stack.push(3), Some(1));

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
    }

    #[test]
    fn clear_empties_the_stack() {
        let mut stack = UndoStack::new(4);
        stack.push("a");
        stack.push("b");
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut stack = UndoStack::new(0);
        assert_eq!(stack.capacity(), 1);
        assert!(stack.push(1).is_none());
        assert_eq!(stack.push(2), Some(1));
    }

    #[test]
    fn action_descriptions() {
        let soft = FileAction::Delete {
            original: "a.jpg".into(),
            staged: "_DELETE__a.jpg".into(),
            original_sidecar: None,
            staged_sidecar: None,
            hard: false,
        };
        assert_eq!(soft.description(), "soft delete file");

        let hard = FileAction::Delete {
            original: "a.jpg".into(),
            staged: "/tmp/stage/a.jpg".into(),
            original_sidecar: None,
            staged_sidecar: None,
            hard: true,
        };
        assert_eq!(hard.description(), "hard delete file");

        assert_eq!(BoxAction::Add { index: 0 }.description(), "add bounding box");
    }
}
