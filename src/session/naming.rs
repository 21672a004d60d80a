//! Filename conventions: the soft-delete marker, count suffixes, and
//! model-confidence tags.
//!
//! Earlier passes over a photo set leave breadcrumbs in filenames. A
//! detector run prefixes confidence tags (`C99_foxes_...`), a counting
//! pass appends `__<count><class>` suffixes, and soft deletion prefixes
//! `_DELETE__`. Saving through fixup mode writes files back out under
//! their clean names, so all of these have to be recognized and
//! stripped.

use std::sync::OnceLock;

use regex::Regex;

/// Prefix marking a file as soft-deleted.
pub const DELETE_MARKER: &str = "_DELETE__";

/// Returns true if the file name carries the soft-delete marker.
pub fn is_marked_deleted(file_name: &str) -> bool {
    file_name.starts_with(DELETE_MARKER)
}

fn count_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"__\d+[a-zA-Z_]+").expect("valid count-suffix regex"))
}

fn confidence_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^C(\d+)$").expect("valid confidence-token regex"))
}

fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// Strips `__<count><class>` suffixes from a file name's stem.
pub fn strip_count_suffixes(file_name: &str) -> String {
    let (stem, ext) = split_extension(file_name);
    let stripped = count_suffix_re().replace_all(stem, "");
    format!("{stripped}{ext}")
}

/// Extracts the first two model confidences embedded in a file name.
///
/// Confidence tags are underscore-delimited `C<digits>` tokens, e.g.
/// `C99_foxes_C88_empty_shot042.jpg` yields `(Some(99), Some(88))`.
pub fn confidence_tags(file_name: &str) -> (Option<u32>, Option<u32>) {
    let (stem, _) = split_extension(file_name);
    let mut found = stem
        .split('_')
        .filter_map(|token| confidence_token_re().captures(token))
        .filter_map(|caps| caps[1].parse::<u32>().ok());
    (found.next(), found.next())
}

/// Removes confidence tags (and the class name following each tag) from
/// a file name, keeping the rest of the stem intact.
///
/// `classes` is the set of class names the tagging pass could have
/// written; `empty` (the no-detection marker) is always recognized.
/// Class names may be spelled with hyphens in place of underscores.
pub fn strip_confidence_tags(file_name: &str, classes: &[String]) -> String {
    let (stem, ext) = split_extension(file_name);

    let canon = |s: &str| s.replace('-', "_");
    let known: Vec<String> = classes
        .iter()
        .map(|c| canon(c))
        .chain(std::iter::once("empty".to_string()))
        .collect();
    let max_run = known
        .iter()
        .map(|c| c.split('_').count())
        .max()
        .unwrap_or(1);

    let tokens: Vec<&str> = stem.split('_').collect();
    let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if confidence_token_re().is_match(tokens[i]) {
            i += 1;
            // Swallow the class name the tag refers to, longest match first.
            for run in (1..=max_run.min(tokens.len() - i)).rev() {
                let candidate = canon(&tokens[i..i + run].join("_"));
                if known.iter().any(|c| *c == candidate) {
                    i += run;
                    break;
                }
            }
        } else {
            kept.push(tokens[i]);
            i += 1;
        }
    }

    if kept.is_empty() {
        return file_name.to_string();
    }
    format!("{}{ext}", kept.join("_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<String> {
        ["foxes", "mountain_lions", "deer"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn delete_marker() {
        assert!(is_marked_deleted("_DELETE__shot.jpg"));
        assert!(!is_marked_deleted("shot.jpg"));
    }

    #[test]
    fn count_suffixes_are_stripped() {
        assert_eq!(strip_count_suffixes("shot__2deer.jpg"), "shot.jpg");
        assert_eq!(
            strip_count_suffixes("shot__1coyote__2deer.jpg"),
            "shot.jpg"
        );
        assert_eq!(strip_count_suffixes("shot.jpg"), "shot.jpg");
    }

    #[test]
    fn confidences_are_extracted_in_order() {
        let cases = [
            ("C99_myfile.jpg", (Some(99), None)),
            ("C99_foxes_C88_empty_myfile.jpg", (Some(99), Some(88))),
            ("C99_mountain_lions_C88_empty_myfile.jpg", (Some(99), Some(88))),
            ("C99_mountain-lions_C88_empty_myfile.jpg", (Some(99), Some(88))),
            ("myfile_C77.jpg", (Some(77), None)),
            ("myfile_C77_foxes_C66_empty.jpg", (Some(77), Some(66))),
            ("myfile.jpg", (None, None)),
        ];
        for (name, expected) in cases {
            assert_eq!(confidence_tags(name), expected, "case {name}");
        }
    }

    #[test]
    fn confidence_tags_are_stripped() {
        let classes = classes();
        let cases = [
            ("C99_myfile.jpg", "myfile.jpg"),
            ("C99_foxes_C88_empty_myfile.jpg", "myfile.jpg"),
            ("C99_mountain_lions_C88_empty_myfile.jpg", "myfile.jpg"),
            ("C99_mountain-lions_C88_empty_myfile.jpg", "myfile.jpg"),
            ("myfile_C77.jpg", "myfile.jpg"),
            ("myfile_C77_foxes_C66_empty.jpg", "myfile.jpg"),
            ("myfile.jpg", "myfile.jpg"),
        ];
        for (name, expected) in cases {
            assert_eq!(strip_confidence_tags(name, &classes), expected, "case {name}");
        }
    }

    #[test]
    fn stem_words_matching_nothing_survive() {
        // "empty" in a base name is only swallowed right after a tag.
        assert_eq!(
            strip_confidence_tags("empty_field.jpg", &classes()),
            "empty_field.jpg"
        );
    }
}
