//! Graph construction from the three edge sources.
//!
//! 1. **Tags**: entries sharing a tag are linked, optionally IDF-weighted and
//!    with hub tags dropped
//! 2. **Sources**: entries citing the same provenance path are linked
//! 3. **Mentions**: entries whose text names another entry's slug are linked

use aspect_model::EntrySet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AspectGraph, TagReconciler};
use crate::error::DensityError;

/// Which relations become edges, and how tag edges are weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphOptions {
    /// Link entries whose text mentions another entry's slug.
    pub include_slug_links: bool,

    /// Link entries sharing a provenance source path.
    pub include_source_links: bool,

    /// Drop tags whose resolved count covers at least this fraction of entries.
    pub ignore_tag_frac: Option<f64>,

    /// Build the weighted adjacency with inverse-frequency tag weights.
    pub weighted: bool,

    /// Exponent applied to the tag weight denominator.
    pub idf_gamma: f64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            include_slug_links: false,
            include_source_links: false,
            ignore_tag_frac: None,
            weighted: false,
            idf_gamma: 1.0,
        }
    }
}

/// Inverse-frequency weight of an edge contributed by a tag with `references`
/// occurrences: `1 / log2(1 + references)^gamma`.
///
/// Returns `None` when the denominator is not positive.
pub fn idf_weight(references: usize, gamma: f64) -> Option<f64> {
    let denom = (1.0 + references as f64).log2();
    if denom <= 0.0 {
        return None;
    }
    Some(1.0 / denom.powf(gamma))
}

/// Build the relationship graph for a whole entry collection.
pub fn build_graph(
    entries: &EntrySet,
    options: &GraphOptions,
    reconciler: &mut TagReconciler<'_>,
) -> Result<AspectGraph, DensityError> {
    let slugs = entries.iter().map(|entry| entry.slug.clone());
    let mut graph = AspectGraph::with_nodes(slugs, options.weighted);

    link_tags(&mut graph, entries, options, reconciler);
    if options.include_source_links {
        link_sources(&mut graph, entries);
    }
    if options.include_slug_links {
        link_mentions(&mut graph, entries)?;
    }

    tracing::debug!(
        "Built graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn link_tags(
    graph: &mut AspectGraph,
    entries: &EntrySet,
    options: &GraphOptions,
    reconciler: &mut TagReconciler<'_>,
) {
    let mut tag_index: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for entry in entries.iter() {
        for tag in &entry.tags {
            tag_index
                .entry(tag.as_str())
                .or_default()
                .push(entry.slug.as_str());
        }
    }

    let total = entries.len();
    if let (Some(fraction), true) = (options.ignore_tag_frac, total > 0) {
        tag_index.retain(|tag, slugs| {
            let references = reconciler.resolved_count(tag, slugs.len());
            let hub = references as f64 / total as f64 >= fraction;
            if hub {
                tracing::debug!("Ignoring hub tag '{}' ({} references)", tag, references);
            }
            !hub
        });
    }

    for (tag, slugs) in &tag_index {
        if slugs.len() < 2 {
            continue;
        }
        let references = reconciler.resolved_count(tag, slugs.len());
        let weight = if options.weighted {
            match idf_weight(references, options.idf_gamma) {
                Some(weight) => weight,
                None => continue,
            }
        } else {
            1.0
        };
        link_clique(graph, slugs, weight);
    }
}

fn link_sources(graph: &mut AspectGraph, entries: &EntrySet) {
    let mut source_index: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for entry in entries.iter() {
        for source in &entry.sources {
            source_index
                .entry(source.as_str())
                .or_default()
                .push(entry.slug.as_str());
        }
    }

    for slugs in source_index.values() {
        link_clique(graph, slugs, 1.0);
    }
}

/// Pairwise scan over all entries, so cost grows with the square of the
/// collection size.
fn link_mentions(graph: &mut AspectGraph, entries: &EntrySet) -> Result<(), DensityError> {
    let entries = entries.as_slice();
    let patterns = entries
        .iter()
        .map(|entry| mention_pattern(&entry.slug_lower))
        .collect::<Result<Vec<_>, _>>()?;

    for (i, entry) in entries.iter().enumerate() {
        for (j, other) in entries.iter().enumerate().skip(i + 1) {
            if patterns[j].is_match(&entry.searchable_text)
                || patterns[i].is_match(&other.searchable_text)
            {
                graph.add_edge(&entry.slug, &other.slug, 1.0);
            }
        }
    }
    Ok(())
}

/// Pattern matching `slug` as a whole token: neither neighbor may be a
/// lower-case letter, digit, `_` or `-`.
pub fn mention_pattern(slug_lower: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?:^|[^a-z0-9_-]){}(?:[^a-z0-9_-]|$)",
        regex::escape(slug_lower)
    ))
}

fn link_clique(graph: &mut AspectGraph, slugs: &[&str], weight: f64) {
    for (i, a) in slugs.iter().enumerate() {
        for b in &slugs[i + 1..] {
            graph.add_edge(a, b, weight);
        }
    }
}
