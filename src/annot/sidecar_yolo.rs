//! YOLO text sidecar reader and writer.
//!
//! One line per labeled box: `<class_id> <cx> <cy> <w> <h>` with
//! normalized center/size coordinates. Class ids come from the
//! [`ClassRegistry`](crate::config::ClassRegistry); the in-memory
//! representation stays pixel-space XYXY.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::bbox::BBox;
use super::coord::Normalized;
use super::model::LabeledBox;
use crate::config::ClassRegistry;
use crate::error::TrailmarkError;

/// A parsed YOLO label line before denormalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloLine {
    pub class_id: usize,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// Parses a single label line. Blank lines yield `None`.
///
/// Lines with more than five fields are segmentation or pose rows, which
/// this tool does not edit; they are rejected rather than silently
/// truncated to a box.
pub fn parse_yolo_line(
    line: &str,
    path: &Path,
    line_num: usize,
) -> Result<Option<YoloLine>, TrailmarkError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }

    if fields.len() != 5 {
        return Err(TrailmarkError::YoloLabelParse {
            path: path.to_path_buf(),
            line: line_num,
            message: format!(
                "expected 5 fields, found {} (segmentation/pose rows are not supported)",
                fields.len()
            ),
        });
    }

    let class_id: usize = fields[0].parse().map_err(|_| TrailmarkError::YoloLabelParse {
        path: path.to_path_buf(),
        line: line_num,
        message: format!("invalid class id '{}'", fields[0]),
    })?;

    let mut values = [0.0f64; 4];
    for (slot, field) in values.iter_mut().zip(&fields[1..]) {
        *slot = field.parse().map_err(|_| TrailmarkError::YoloLabelParse {
            path: path.to_path_buf(),
            line: line_num,
            message: format!("invalid coordinate '{}'", field),
        })?;
    }

    Ok(Some(YoloLine {
        class_id,
        cx: values[0],
        cy: values[1],
        w: values[2],
        h: values[3],
    }))
}

/// Reads a YOLO sidecar into labeled boxes.
///
/// `image_width`/`image_height` are needed to denormalize into pixel
/// space. Class ids outside the registry are an error.
pub fn read_yolo_sidecar(
    path: &Path,
    registry: &ClassRegistry,
    image_width: u32,
    image_height: u32,
) -> Result<Vec<LabeledBox>, TrailmarkError> {
    let content = fs::read_to_string(path)?;

    let mut boxes = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        let Some(parsed) = parse_yolo_line(line, path, line_num)? else {
            continue;
        };

        let label = registry.name_of(parsed.class_id).ok_or_else(|| {
            TrailmarkError::YoloLabelParse {
                path: path.to_path_buf(),
                line: line_num,
                message: format!(
                    "class id {} is out of range for {} class(es)",
                    parsed.class_id,
                    registry.len()
                ),
            }
        })?;

        let bbox_norm =
            BBox::<Normalized>::from_cxcywh(parsed.cx, parsed.cy, parsed.w, parsed.h);
        let bbox_px = bbox_norm.to_pixel(image_width as f64, image_height as f64);
        boxes.push(LabeledBox::labeled(bbox_px, label));
    }
    Ok(boxes)
}

/// Writes labeled boxes as a YOLO sidecar. Unlabeled boxes and boxes
/// whose label is not in the registry are skipped.
pub fn write_yolo_sidecar(
    path: &Path,
    boxes: &[LabeledBox],
    registry: &ClassRegistry,
    image_width: u32,
    image_height: u32,
) -> Result<(), TrailmarkError> {
    let mut file = fs::File::create(path)?;

    for b in boxes {
        let Some(class_id) = b.label.as_deref().and_then(|l| registry.id_of(l)) else {
            continue;
        };

        let bbox_norm = b.bbox.to_normalized(image_width as f64, image_height as f64);
        let (cx, cy, w, h) = bbox_norm.to_cxcywh();
        writeln!(file, "{} {:.6} {:.6} {:.6} {:.6}", class_id, cx, cy, w, h)?;
    }
    Ok(())
}
