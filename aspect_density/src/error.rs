//! Analysis errors.

use aspect_model::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of a density analysis run.
#[derive(Error, Debug)]
pub enum DensityError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("No entries found in the ASPECTS file.")]
    NoEntries,

    #[error("{option} {reason}")]
    InvalidOption {
        option: &'static str,
        reason: &'static str,
    },

    #[error("Failed to read config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid mention pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
