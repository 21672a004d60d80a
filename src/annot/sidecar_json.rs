//! JSON sidecar reader and writer.
//!
//! The sidecar sits next to the image as `<stem>.json` and is an object
//! keyed by class label, each value a list of `{x1, y1, x2, y2}`
//! rectangles:
//!
//! ```json
//! {
//!   "coyote": [{"x1": 10.0, "y1": 10.0, "x2": 50.0, "y2": 50.0}]
//! }
//! ```
//!
//! Unlabeled boxes are never persisted. An image that was reviewed and
//! found empty still gets a sidecar (`{}`), which is what marks it as
//! done during discovery.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::bbox::BBox;
use super::coord::Pixel;
use super::model::LabeledBox;
use crate::error::TrailmarkError;

type SidecarData = BTreeMap<String, Vec<BBox<Pixel>>>;

/// Reads a JSON sidecar into labeled boxes.
pub fn read_json_sidecar(path: &Path) -> Result<Vec<LabeledBox>, TrailmarkError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let data: SidecarData =
        serde_json::from_reader(reader).map_err(|source| TrailmarkError::SidecarParse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut boxes = Vec::new();
    for (label, rects) in data {
        for bbox in rects {
            boxes.push(LabeledBox::labeled(bbox, label.clone()));
        }
    }
    Ok(boxes)
}

/// Writes labeled boxes as a JSON sidecar. Unlabeled boxes are skipped.
pub fn write_json_sidecar(path: &Path, boxes: &[LabeledBox]) -> Result<(), TrailmarkError> {
    let mut data = SidecarData::new();
    for b in boxes {
        let Some(label) = &b.label else {
            continue;
        };
        data.entry(label.clone()).or_default().push(b.bbox);
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &data).map_err(|source| TrailmarkError::SidecarWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_boxes() -> Vec<LabeledBox> {
        vec![
            LabeledBox::labeled(BBox::from_xyxy(10.0, 10.0, 50.0, 50.0), "class_a"),
            LabeledBox::labeled(BBox::from_xyxy(60.0, 60.0, 100.0, 100.0), "class_b"),
            LabeledBox::labeled(BBox::from_xyxy(20.0, 20.0, 40.0, 40.0), "class_a"),
        ]
    }

    #[test]
    fn write_groups_by_label() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("image0.json");

        write_json_sidecar(&path, &sample_boxes()).expect("write sidecar");

        let raw = std::fs::read_to_string(&path).expect("read sidecar");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("parse sidecar");
        let expected: serde_json::Value = serde_json::json!({
            "class_a": [
                {"x1": 10.0, "y1": 10.0, "x2": 50.0, "y2": 50.0},
                {"x1": 20.0, "y1": 20.0, "x2": 40.0, "y2": 40.0},
            ],
            "class_b": [
                {"x1": 60.0, "y1": 60.0, "x2": 100.0, "y2": 100.0},
            ],
        });
        assert_eq!(value, expected);
    }

    #[test]
    fn write_skips_unlabeled_and_empty_is_object() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("image0.json");

        let boxes = vec![LabeledBox::unlabeled(BBox::from_xyxy(0.0, 0.0, 5.0, 5.0))];
        write_json_sidecar(&path, &boxes).expect("write sidecar");

        let raw = std::fs::read_to_string(&path).expect("read sidecar");
        assert_eq!(raw, "{}");
    }

    #[test]
    fn read_back_preserves_boxes() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("image0.json");

        write_json_sidecar(&path, &sample_boxes()).expect("write sidecar");
        let restored = read_json_sidecar(&path).expect("read sidecar");

        assert_eq!(restored.len(), 3);
        assert!(restored.iter().all(LabeledBox::is_labeled));
        assert_eq!(
            restored
                .iter()
                .filter(|b| b.label.as_deref() == Some("class_a"))
                .count(),
            2
        );
    }

    #[test]
    fn read_rejects_malformed_sidecar() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("image0.json");
        std::fs::write(&path, "[1, 2, 3]").expect("write bad sidecar");

        let err = read_json_sidecar(&path).unwrap_err();
        assert!(matches!(err, TrailmarkError::SidecarParse { .. }));
    }
}
