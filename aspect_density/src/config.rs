//! Analysis configuration.
//!
//! Every option can come from an optional TOML file; command-line flags are
//! applied on top by the `adi` binary.
//!
//! ```toml
//! per_section = true
//! weighted = true
//! idf_gamma = 1.5
//! ignore_tag_frac = 0.15
//! adi_threshold = 4.0
//! tags_catalog = "aspects/ASPECTS.tags.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::DensityError;
use crate::knowledge_base::GraphOptions;
use crate::report::ReportOptions;

/// Default flood-warning threshold for the density index.
pub const DEFAULT_ADI_THRESHOLD: f64 = 4.0;

/// Default exponent of the IDF weight denominator.
pub const DEFAULT_IDF_GAMMA: f64 = 1.0;

/// All options of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Also compute statistics for each section.
    pub per_section: bool,

    pub include_slug_links: bool,

    pub include_source_links: bool,

    /// Hub-tag suppression fraction, within `[0.0, 1.0]`.
    pub ignore_tag_frac: Option<f64>,

    pub weighted: bool,

    /// Must be strictly positive.
    pub idf_gamma: f64,

    /// Scopes whose density index reaches this value are flagged.
    pub adi_threshold: f64,

    pub show_isolates: bool,

    /// Maximum isolates listed per scope.
    pub isolate_limit: Option<usize>,

    /// Optional tag catalog with cached reference counts.
    pub tags_catalog: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            per_section: false,
            include_slug_links: false,
            include_source_links: false,
            ignore_tag_frac: None,
            weighted: false,
            idf_gamma: DEFAULT_IDF_GAMMA,
            adi_threshold: DEFAULT_ADI_THRESHOLD,
            show_isolates: false,
            isolate_limit: None,
            tags_catalog: None,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, DensityError> {
        let text = std::fs::read_to_string(path).map_err(|source| DensityError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text; `path` is only used in error messages.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, DensityError> {
        toml::from_str(text).map_err(|source| DensityError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check option ranges.
    pub fn validate(&self) -> Result<(), DensityError> {
        if let Some(fraction) = self.ignore_tag_frac {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(DensityError::InvalidOption {
                    option: "--ignore-tag-frac",
                    reason: "must be between 0.0 and 1.0",
                });
            }
        }
        if self.idf_gamma.is_nan() || self.idf_gamma <= 0.0 {
            return Err(DensityError::InvalidOption {
                option: "--idf-gamma",
                reason: "must be greater than 0",
            });
        }
        Ok(())
    }

    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            include_slug_links: self.include_slug_links,
            include_source_links: self.include_source_links,
            ignore_tag_frac: self.ignore_tag_frac,
            weighted: self.weighted,
            idf_gamma: self.idf_gamma,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            show_isolates: self.show_isolates,
            isolate_limit: self.isolate_limit,
        }
    }
}
