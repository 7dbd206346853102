//! Raw ASPECTS document - the JSON shape shared with the record-management tools.
//!
//! Only the fields the density engine reads are modelled; everything else
//! (`importance`, `lastUpdated`, source hashes, ...) is ignored on load.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::ModelError;

/// Top-level knowledge-base document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AspectsDocument {
    #[serde(default)]
    pub sections: Vec<RawSection>,
}

/// A section groups entries under a slug.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSection {
    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

/// An entry exactly as stored in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub slug: Option<String>,

    /// Stable identifier, unique across the document when present.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Provenance records; kept untyped so malformed ones can be skipped.
    #[serde(default)]
    pub sources: Vec<Value>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl AspectsDocument {
    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ModelError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ModelError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let document: Self = serde_json::from_str(&text).map_err(|source| ModelError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            "Loaded {} sections from {}",
            document.sections.len(),
            path.display()
        );
        Ok(document)
    }
}

impl RawEntry {
    /// Paths of well-formed source records (objects with a string `path`).
    pub fn source_paths(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .filter_map(|source| source.get("path").and_then(Value::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let doc: AspectsDocument = serde_json::from_value(json!({
            "version": 3,
            "sections": [{
                "id": "sec-1",
                "slug": "core",
                "title": "Core",
                "entries": [{
                    "slug": "alpha",
                    "id": "aspect-alpha",
                    "tags": ["x"],
                    "importance": 0.7,
                    "lastUpdated": "2024-01-01"
                }]
            }]
        }))
        .unwrap();

        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].entries[0].slug.as_deref(), Some("alpha"));
        assert_eq!(doc.sections[0].entries[0].tags, vec!["x".to_string()]);
    }

    #[test]
    fn test_source_paths_skip_malformed() {
        let entry: RawEntry = serde_json::from_value(json!({
            "slug": "alpha",
            "sources": [
                {"path": "src/a.rs", "sha256": "abc"},
                {"path": 42},
                "src/b.rs",
                {"sha256": "def"},
                {"path": "src/c.rs"}
            ]
        }))
        .unwrap();

        let paths: Vec<_> = entry.source_paths().collect();
        assert_eq!(paths, vec!["src/a.rs", "src/c.rs"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AspectsDocument::load(&dir.path().join("ASPECTS.json")).unwrap_err();
        assert!(matches!(err, ModelError::NotFound { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = AspectsDocument::load(file.path()).unwrap_err();
        assert!(matches!(err, ModelError::Json { .. }));
        assert!(err.to_string().starts_with("Invalid JSON in"));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sections": [{{"slug": "core", "entries": [{{"slug": "alpha"}}]}}]}}"#
        )
        .unwrap();

        let doc = AspectsDocument::load(file.path()).unwrap();
        assert_eq!(doc.sections[0].slug.as_deref(), Some("core"));
    }
}
