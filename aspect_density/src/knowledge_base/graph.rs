//! Aspect Graph - undirected relationship graph over entry slugs.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Symmetric adjacency over entry slugs.
///
/// The unweighted adjacency only records that two entries are related. The
/// weighted adjacency, present when weighting is enabled, accumulates one
/// contribution per independent relation between the same pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AspectGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
    weighted: Option<BTreeMap<String, BTreeMap<String, f64>>>,
}

impl AspectGraph {
    /// Create a graph with the given nodes and no edges.
    pub fn with_nodes<I, S>(slugs: I, weighted: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let adjacency: BTreeMap<String, BTreeSet<String>> = slugs
            .into_iter()
            .map(|slug| (slug.into(), BTreeSet::new()))
            .collect();
        let weighted = weighted.then(|| {
            adjacency
                .keys()
                .map(|slug| (slug.clone(), BTreeMap::new()))
                .collect()
        });
        Self {
            adjacency,
            weighted,
        }
    }

    /// Add an undirected edge, accumulating `weight` on both directions.
    ///
    /// Self-loops are ignored.
    pub fn add_edge(&mut self, a: &str, b: &str, weight: f64) {
        if a == b {
            return;
        }

        self.adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());

        if let Some(weighted) = self.weighted.as_mut() {
            *weighted
                .entry(a.to_string())
                .or_default()
                .entry(b.to_string())
                .or_insert(0.0) += weight;
            *weighted
                .entry(b.to_string())
                .or_default()
                .entry(a.to_string())
                .or_insert(0.0) += weight;
        }
    }

    /// Neighbors of a node, if the node exists.
    pub fn neighbors(&self, slug: &str) -> Option<&BTreeSet<String>> {
        self.adjacency.get(slug)
    }

    /// Weighted neighbors of a node; `None` when unweighted or unknown.
    pub fn weighted_neighbors(&self, slug: &str) -> Option<&BTreeMap<String, f64>> {
        self.weighted.as_ref()?.get(slug)
    }

    /// Accumulated weight between two nodes.
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<f64> {
        self.weighted_neighbors(a)?.get(b).copied()
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.adjacency
            .get(a)
            .map(|neighbors| neighbors.contains(b))
            .unwrap_or(false)
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted.is_some()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Each undirected edge once, as `(smaller, larger)` slug pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.adjacency.iter().flat_map(|(a, neighbors)| {
            neighbors
                .iter()
                .filter(move |b| a.as_str() < b.as_str())
                .map(move |b| (a.as_str(), b.as_str()))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Iterate over all nodes in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }
}
