//! Tag frequency reconciliation against the cached tag catalog.

use aspect_model::TagCatalog;
use std::collections::{BTreeMap, BTreeSet};

/// Warnings of each kind printed before the rest are suppressed.
pub const WARNING_LIMIT: usize = 5;

/// Resolves the reference count used for each tag during one analysis run.
///
/// The baseline is the number of entries carrying the tag in the live
/// collection. When a catalog is supplied the resolved count is
/// `max(baseline, catalog)`. Results are memoized, so the value for a tag does
/// not depend on which tags were resolved before it.
#[derive(Debug)]
pub struct TagReconciler<'a> {
    catalog: Option<&'a TagCatalog>,
    resolved: BTreeMap<String, usize>,
    missing: BTreeSet<String>,
    mismatched: BTreeSet<String>,
    warnings: Vec<String>,
}

impl<'a> TagReconciler<'a> {
    pub fn new(catalog: Option<&'a TagCatalog>) -> Self {
        Self {
            catalog,
            resolved: BTreeMap::new(),
            missing: BTreeSet::new(),
            mismatched: BTreeSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Resolved reference count for `tag`, observed on `occurrences` entries.
    pub fn resolved_count(&mut self, tag: &str, occurrences: usize) -> usize {
        if let Some(count) = self.resolved.get(tag) {
            return *count;
        }

        let value = match self.catalog.map(|catalog| catalog.get(tag)) {
            None => occurrences,
            Some(None) => {
                if self.missing.len() < WARNING_LIMIT {
                    self.warn(format!(
                        "tag '{}' has no cached count in catalog; run tags sync-counts.",
                        tag
                    ));
                }
                self.missing.insert(tag.to_string());
                occurrences
            }
            Some(Some(cached)) => {
                let recorded = usize::try_from(cached).ok();
                if recorded != Some(occurrences) {
                    if self.mismatched.len() < WARNING_LIMIT {
                        self.warn(format!(
                            "tag '{}' count mismatch (catalog={}, aspects={}); run tags sync-counts.",
                            tag, cached, occurrences
                        ));
                    }
                    self.mismatched.insert(tag.to_string());
                }
                // A catalog that under-reports never lowers the live count.
                recorded.map_or(occurrences, |recorded| occurrences.max(recorded))
            }
        };

        self.resolved.insert(tag.to_string(), value);
        value
    }

    /// Tags that were absent from the catalog.
    pub fn missing_tags(&self) -> &BTreeSet<String> {
        &self.missing
    }

    /// Tags whose catalog count differed from the live count.
    pub fn mismatched_tags(&self) -> &BTreeSet<String> {
        &self.mismatched
    }

    /// Emit the suppressed-count summaries and return every warning in order.
    pub fn finish(mut self) -> Vec<String> {
        if self.catalog.is_some() {
            if self.missing.len() > WARNING_LIMIT {
                let suppressed = self.missing.len() - WARNING_LIMIT;
                self.warn(format!(
                    "{} additional tags missing catalog counts (suppressed).",
                    suppressed
                ));
            }
            if self.mismatched.len() > WARNING_LIMIT {
                let suppressed = self.mismatched.len() - WARNING_LIMIT;
                self.warn(format!(
                    "{} additional catalog/tag count mismatches suppressed.",
                    suppressed
                ));
            }
        }
        self.warnings
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}
