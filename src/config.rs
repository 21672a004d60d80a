//! Keystroke-to-class configuration.
//!
//! The key map binds single keystrokes to class names and is either the
//! built-in wildlife map or a JSON object loaded from a config file.
//! The class registry derives YOLO class ids from it: class names sorted
//! lexicographically, id = position. The save path and the rename path
//! both go through the registry so the ids always agree.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrailmarkError;

/// Mapping from a keystroke to a class name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMap {
    entries: BTreeMap<String, String>,
}

impl KeyMap {
    /// Builds a key map from explicit entries.
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Loads a key map from a JSON object file, or returns the default
    /// map when no path is given.
    pub fn load(config_path: Option<&Path>) -> Result<Self, TrailmarkError> {
        let Some(path) = config_path else {
            return Ok(Self::default());
        };

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let entries: BTreeMap<String, String> =
            serde_json::from_reader(reader).map_err(|source| TrailmarkError::KeyMapParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { entries })
    }

    /// Looks up the class bound to a keystroke.
    pub fn class_for(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over (keystroke, class) pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for KeyMap {
    /// The built-in trail-camera class bindings.
    fn default() -> Self {
        let entries = [
            ("1", "hawks"),
            ("a", "bobcats"),
            ("b", "birds"),
            ("c", "coyote"),
            ("d", "deer"),
            ("f", "foxes"),
            ("g", "eagles"),
            ("h", "humans"),
            ("k", "skunks"),
            ("m", "mountain_lions"),
            ("o", "dogs"),
            ("r", "raccoons"),
            ("s", "squirrels"),
            ("u", "unknown"),
            ("w", "owls"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { entries }
    }
}

/// Class names in their canonical (sorted) order; the position of a name
/// is its numeric class id in YOLO sidecars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassRegistry {
    names: Vec<String>,
}

impl ClassRegistry {
    /// Derives the registry from a key map's class names.
    pub fn from_key_map(key_map: &KeyMap) -> Self {
        let mut names: Vec<String> = key_map
            .entries
            .values()
            .cloned()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        names.sort();
        Self { names }
    }

    /// Returns the numeric class id for a name.
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns the class name for a numeric id.
    pub fn name_of(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_map_has_wildlife_classes() {
        let map = KeyMap::default();
        assert_eq!(map.class_for("d"), Some("deer"));
        assert_eq!(map.class_for("m"), Some("mountain_lions"));
        assert_eq!(map.class_for("z"), None);
    }

    #[test]
    fn load_without_path_gives_default() {
        let map = KeyMap::load(None).expect("load default");
        assert_eq!(map, KeyMap::default());
    }

    #[test]
    fn load_from_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        write!(file, r#"{{"a": "dir_a", "b": "dir_b"}}"#).expect("write config");

        let map = KeyMap::load(Some(file.path())).expect("load config");
        assert_eq!(map.class_for("a"), Some("dir_a"));
        assert_eq!(map.class_for("b"), Some("dir_b"));
        assert!(!map.contains("c"));
    }

    #[test]
    fn load_rejects_malformed_config() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        write!(file, "not json").expect("write config");

        let err = KeyMap::load(Some(file.path())).unwrap_err();
        assert!(matches!(
            err,
            crate::error::TrailmarkError::KeyMapParse { .. }
        ));
    }

    #[test]
    fn registry_ids_follow_sorted_names() {
        let map = KeyMap::new(
            [("0", "cat"), ("1", "dog")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        let registry = ClassRegistry::from_key_map(&map);
        assert_eq!(registry.id_of("cat"), Some(0));
        assert_eq!(registry.id_of("dog"), Some(1));
        assert_eq!(registry.name_of(1), Some("dog"));
        assert_eq!(registry.name_of(2), None);
    }

    #[test]
    fn registry_dedupes_shared_classes() {
        let map = KeyMap::new(
            [("a", "deer"), ("b", "deer"), ("c", "coyote")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        let registry = ClassRegistry::from_key_map(&map);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.id_of("coyote"), Some(0));
        assert_eq!(registry.id_of("deer"), Some(1));
    }
}
