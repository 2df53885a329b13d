//! Dataset settings document: ontology path plus named learning problems.
//!
//! Loaded once at startup from a JSON file and immutable thereafter:
//!
//! ```json
//! {
//!   "data_path": "family.owl",
//!   "problems": {
//!     "Aunt": {
//!       "positive_examples": ["http://example.org/family#anna"],
//!       "negative_examples": ["http://example.org/family#heinz"]
//!     }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::individual::Individual;

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// Positive/negative example sets for one named learning problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSpec {
    /// Individuals that belong to the target concept.
    pub positive_examples: BTreeSet<Individual>,
    /// Individuals that do not belong to the target concept.
    pub negative_examples: BTreeSet<Individual>,
}

/// The settings document for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsDoc {
    /// Path to the ontology artifact, resolved relative to the settings file.
    pub data_path: PathBuf,
    /// Learning problems keyed by target-concept name. `BTreeMap` keeps the
    /// pipeline's problem order stable across runs.
    pub problems: BTreeMap<String, ProblemSpec>,
}

impl SettingsDoc {
    /// Load and validate a settings document from a JSON file.
    ///
    /// Validation rejects an empty problem map and any problem whose positive
    /// and negative sets overlap.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let doc: SettingsDoc =
            serde_json::from_str(&text).map_err(|e| SettingsError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        if doc.problems.is_empty() {
            return Err(SettingsError::NoProblems {
                path: path.display().to_string(),
            });
        }
        for (name, spec) in &doc.problems {
            let overlap = spec
                .positive_examples
                .intersection(&spec.negative_examples)
                .count();
            if overlap > 0 {
                return Err(SettingsError::OverlappingExamples {
                    problem: name.clone(),
                    count: overlap,
                });
            }
        }
        Ok(doc)
    }

    /// The ontology path resolved against the directory of the settings file.
    pub fn resolved_data_path(&self, settings_path: &Path) -> PathBuf {
        if self.data_path.is_absolute() {
            self.data_path.clone()
        } else {
            settings_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(&self.data_path)
        }
    }
}

/// The dataset name used in report and artifact file names: the settings
/// file stem (e.g. `mammograph` for `mammograph.json`).
pub fn dataset_name(settings_path: &Path) -> String {
    settings_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_settings(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_valid_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_settings(
            dir.path(),
            "family.json",
            r#"{
                "data_path": "family.owl",
                "problems": {
                    "Aunt": {
                        "positive_examples": ["http://e.org#anna"],
                        "negative_examples": ["http://e.org#heinz"]
                    }
                }
            }"#,
        );
        let doc = SettingsDoc::load(&path).unwrap();
        assert_eq!(doc.problems.len(), 1);
        assert_eq!(
            doc.resolved_data_path(&path),
            dir.path().join("family.owl")
        );
        assert_eq!(dataset_name(&path), "family");
    }

    #[test]
    fn rejects_empty_problem_map() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_settings(
            dir.path(),
            "empty.json",
            r#"{"data_path": "x.owl", "problems": {}}"#,
        );
        let err = SettingsDoc::load(&path).unwrap_err();
        assert!(matches!(err, SettingsError::NoProblems { .. }));
    }

    #[test]
    fn rejects_overlapping_examples() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_settings(
            dir.path(),
            "overlap.json",
            r#"{
                "data_path": "x.owl",
                "problems": {
                    "C": {
                        "positive_examples": ["http://e.org#a", "http://e.org#b"],
                        "negative_examples": ["http://e.org#b"]
                    }
                }
            }"#,
        );
        let err = SettingsDoc::load(&path).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::OverlappingExamples { count: 1, .. }
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_settings(dir.path(), "bad.json", "{not json");
        let err = SettingsDoc::load(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }
}
