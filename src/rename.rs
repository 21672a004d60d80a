//! EXIF-driven batch renaming.
//!
//! Labeled photo sets get renamed so the filesystem sort order matches
//! capture time and the name itself says what was found:
//! `2025-01-01 12:00:00_1foxes--original_name.jpg`. The original name is
//! preserved after the `--` separator, which is what makes the rename
//! reversible.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use exif::{In, Tag, Value};

use crate::annot;
use crate::config::ClassRegistry;
use crate::error::TrailmarkError;
use crate::session::naming::is_marked_deleted;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Separator between the generated prefix and the original file name.
const NAME_SEPARATOR: &str = "--";

/// Reads the capture time from an image's EXIF data.
///
/// `DateTimeOriginal` is preferred, then `DateTimeDigitized`, then the
/// plain `DateTime`. Images without usable EXIF yield `Ok(None)` rather
/// than an error; the caller decides whether that is worth reporting.
pub fn image_datetime(path: &Path) -> Result<Option<NaiveDateTime>, TrailmarkError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let Ok(data) = exif::Reader::new().read_from_container(&mut reader) else {
        return Ok(None);
    };

    for tag in [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime] {
        let Some(field) = data.get_field(tag, In::PRIMARY) else {
            continue;
        };
        let Value::Ascii(values) = &field.value else {
            continue;
        };
        let Some(raw) = values.first() else {
            continue;
        };
        let text = String::from_utf8_lossy(raw);
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text.trim(), EXIF_DATETIME_FORMAT) {
            return Ok(Some(parsed));
        }
    }
    Ok(None)
}

/// Counts labeled boxes per class in a sidecar file (either format).
pub fn class_counts(
    label_path: &Path,
    registry: &ClassRegistry,
) -> Result<BTreeMap<String, usize>, TrailmarkError> {
    let mut counts = BTreeMap::new();

    if label_path.extension().and_then(|e| e.to_str()) == Some("json") {
        let data = annot::sidecar_json::read_json_sidecar(label_path)?;
        for labeled in data {
            if let Some(label) = labeled.label {
                *counts.entry(label).or_insert(0) += 1;
            }
        }
        return Ok(counts);
    }

    let file = File::open(label_path)?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(first) = trimmed.split_whitespace().next() else {
            continue;
        };
        let Ok(id) = first.parse::<usize>() else {
            continue;
        };
        if let Some(name) = registry.name_of(id) {
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// Renders a count map as the name infix, e.g. `1foxes_2deer`, or
/// `unlabeled` when nothing was found.
fn counts_infix(counts: &BTreeMap<String, usize>) -> String {
    if counts.is_empty() {
        return "unlabeled".to_string();
    }
    counts
        .iter()
        .map(|(class, count)| format!("{count}{class}"))
        .collect::<Vec<_>>()
        .join("_")
}

fn compose_name(timestamp: &NaiveDateTime, counts: &BTreeMap<String, usize>, original: &str) -> String {
    format!("{timestamp}_{}{NAME_SEPARATOR}{original}", counts_infix(counts))
}

/// What to do with images that carry no labels at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Rename them like everything else, tagged `unlabeled`.
    #[default]
    Keep,
    /// Delete them (and their sidecars).
    Remove,
    /// Move them into an `empty/` subdirectory, names unchanged.
    Move,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RenameOptions {
    pub dry_run: bool,
    pub empty: EmptyPolicy,
}

/// Everything a rename pass did (or would do, in a dry run).
#[derive(Clone, Debug, Default)]
pub struct RenameReport {
    pub renamed: Vec<(PathBuf, PathBuf)>,
    pub removed: Vec<PathBuf>,
    pub moved_empty: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, String)>,
}

fn dir_images(dir: &Path) -> Result<Vec<PathBuf>, TrailmarkError> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || is_marked_deleted(name) {
            continue;
        }
        let is_jpeg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
        if is_jpeg {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn rename_pair(
    image: &Path,
    sidecar: Option<&Path>,
    new_name: &str,
    dry_run: bool,
) -> Result<PathBuf, TrailmarkError> {
    let dest = image.with_file_name(new_name);
    if !dry_run {
        fs::rename(image, &dest)?;
        if let Some(sc) = sidecar {
            let sc_ext = sc.extension().and_then(|e| e.to_str()).unwrap_or("json");
            let sc_dest = dest.with_extension(sc_ext);
            fs::rename(sc, sc_dest)?;
        }
    }
    Ok(dest)
}

/// Renames the images directly under `dir` (non-recursive) to
/// `<timestamp>_<counts>--<original name>`, carrying sidecars along.
///
/// Images without an EXIF timestamp, and images already renamed by a
/// previous pass, are skipped with a reason.
pub fn rename_files(
    dir: &Path,
    registry: &ClassRegistry,
    options: RenameOptions,
) -> Result<RenameReport, TrailmarkError> {
    let mut report = RenameReport::default();

    for image in dir_images(dir)? {
        let Some(name) = image.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.contains(NAME_SEPARATOR) {
            report
                .skipped
                .push((image.clone(), "already renamed".to_string()));
            continue;
        }

        let sidecar = annot::find_sidecar(&image);
        let counts = match &sidecar {
            Some(sc) => class_counts(sc, registry)?,
            None => BTreeMap::new(),
        };

        if counts.is_empty() {
            match options.empty {
                EmptyPolicy::Keep => {}
                EmptyPolicy::Remove => {
                    if !options.dry_run {
                        fs::remove_file(&image)?;
                        if let Some(sc) = &sidecar {
                            fs::remove_file(sc)?;
                        }
                    }
                    report.removed.push(image);
                    continue;
                }
                EmptyPolicy::Move => {
                    let empty_dir = dir.join("empty");
                    if !options.dry_run {
                        fs::create_dir_all(&empty_dir)?;
                        fs::rename(&image, empty_dir.join(name))?;
                        if let Some(sc) = &sidecar {
                            if let Some(sc_name) = sc.file_name() {
                                fs::rename(sc, empty_dir.join(sc_name))?;
                            }
                        }
                    }
                    report.moved_empty.push(image);
                    continue;
                }
            }
        }

        let Some(timestamp) = image_datetime(&image)? else {
            report
                .skipped
                .push((image.clone(), "no EXIF timestamp".to_string()));
            continue;
        };

        let new_name = compose_name(&timestamp, &counts, name);
        let dest = rename_pair(&image, sidecar.as_deref(), &new_name, options.dry_run)?;
        report.renamed.push((image, dest));
    }
    Ok(report)
}

/// Reverses a rename pass: every file in `dir` whose name contains
/// exactly one `--` separator gets its original name back.
pub fn undo_rename(dir: &Path, dry_run: bool) -> Result<Vec<(PathBuf, PathBuf)>, TrailmarkError> {
    let mut restored = Vec::new();

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.matches(NAME_SEPARATOR).count() != 1 {
            continue;
        }
        let Some((_, original)) = name.split_once(NAME_SEPARATOR) else {
            continue;
        };
        if original.is_empty() {
            continue;
        }
        let dest = path.with_file_name(original);
        if !dry_run {
            fs::rename(&path, &dest)?;
        }
        restored.push((path, dest));
    }
    Ok(restored)
}
