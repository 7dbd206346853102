//! Tag catalog - cached reference counts maintained by the tag tooling.
//!
//! The catalog is read-only here; keeping it in sync with the knowledge base
//! is the job of `tags sync-counts`.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ModelError;

/// Mapping tag -> recorded number of references.
///
/// Counts are stored as written. A stale or hand-edited catalog may hold
/// negative values, which still count as a recorded (mismatching) value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagCatalog {
    counts: BTreeMap<String, i64>,
}

impl TagCatalog {
    /// Build a catalog from explicit counts.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            counts: counts.into_iter().map(|(tag, n)| (tag.into(), n)).collect(),
        }
    }

    /// Load a catalog file.
    ///
    /// Returns `None` when the catalog holds no usable items, which callers
    /// treat the same as having no catalog at all.
    pub fn load(path: &Path) -> Result<Option<Self>, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ModelError::CatalogNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ModelError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| ModelError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_value(&value, path)?;
        tracing::debug!("Loaded {} catalog tags from {}", catalog.len(), path.display());
        Ok(if catalog.is_empty() { None } else { Some(catalog) })
    }

    /// Extract counts from a parsed catalog document.
    ///
    /// Items without a string `tag` or an integer `number_of_references`
    /// are skipped.
    pub fn from_value(value: &Value, path: &Path) -> Result<Self, ModelError> {
        let items = value
            .get("tags")
            .and_then(Value::as_array)
            .ok_or_else(|| ModelError::InvalidCatalog {
                path: path.to_path_buf(),
            })?;

        let counts = items
            .iter()
            .filter_map(|item| {
                let tag = item.get("tag")?.as_str()?;
                let count = item.get("number_of_references")?.as_i64()?;
                Some((tag.to_string(), count))
            })
            .collect();

        Ok(Self { counts })
    }

    /// Recorded count for a tag, if the catalog knows it.
    pub fn get(&self, tag: &str) -> Option<i64> {
        self.counts.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
