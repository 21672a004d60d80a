//! The in-session annotation record: a pixel-space box plus an optional
//! class label.
//!
//! Boxes are drawn first and labeled afterwards, so "no label yet" is a
//! first-class state rather than an error. Only labeled boxes survive a
//! save; unlabeled ones are working state.

use serde::{Deserialize, Serialize};

use super::bbox::BBox;
use super::coord::Pixel;

/// A bounding box with an optional class label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledBox {
    pub bbox: BBox<Pixel>,
    pub label: Option<String>,
}

impl LabeledBox {
    /// Creates an unlabeled box, the state a freshly drawn box is in.
    pub fn unlabeled(bbox: BBox<Pixel>) -> Self {
        Self { bbox, label: None }
    }

    /// Creates a box with a label already attached.
    pub fn labeled(bbox: BBox<Pixel>, label: impl Into<String>) -> Self {
        Self {
            bbox,
            label: Some(label.into()),
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.label.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_state() {
        let fresh = LabeledBox::unlabeled(BBox::from_xyxy(0.0, 0.0, 5.0, 5.0));
        assert!(!fresh.is_labeled());

        let done = LabeledBox::labeled(BBox::from_xyxy(0.0, 0.0, 5.0, 5.0), "deer");
        assert!(done.is_labeled());
        assert_eq!(done.label.as_deref(), Some("deer"));
    }
}
