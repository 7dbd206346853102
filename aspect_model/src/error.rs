//! Load-time errors for aspect documents and tag catalogs.

use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of offending identifiers listed in a duplicate error.
pub const DUPLICATE_SAMPLE_LIMIT: usize = 5;

/// Errors raised while reading and normalizing the knowledge base.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("ASPECTS file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Tags catalog not found: {}", .path.display())]
    CatalogNotFound { path: PathBuf },

    #[error("Invalid tags catalog format: expected 'tags' array in {}", .path.display())]
    InvalidCatalog { path: PathBuf },

    #[error("Duplicate slugs detected (case-insensitive): {0}. Resolve duplicates before computing ADI.")]
    DuplicateSlugs(String),

    #[error("Duplicate entry ids detected: {0}. Resolve duplicates before computing ADI.")]
    DuplicateIds(String),
}

/// Render a sorted, capped listing such as `a, b, c... (+2 more)`.
pub fn sample_listing(mut items: Vec<String>) -> String {
    items.sort();
    let shown = items
        .iter()
        .take(DUPLICATE_SAMPLE_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > DUPLICATE_SAMPLE_LIMIT {
        format!("{}... (+{} more)", shown, items.len() - DUPLICATE_SAMPLE_LIMIT)
    } else {
        shown
    }
}
