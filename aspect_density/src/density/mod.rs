//! Density statistics - degree metrics over a scope of the graph.
//!
//! A scope is any subset of entry slugs: the whole collection or one section.
//! Only edges with both endpoints inside the scope count, so per-section
//! numbers describe intra-section connectivity.
//!
//! The density index (ADI) is `nodes / average_degree`. Higher means sparser.
//! When the average degree is zero the index is `f64::INFINITY`, which always
//! compares as the worst possible value.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

use crate::knowledge_base::AspectGraph;

/// Weighted counterparts of the unit-degree metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedStats {
    /// Total weighted degree / 2; not necessarily an integer.
    pub edges: f64,
    pub average_degree: f64,
    #[serde(serialize_with = "serialize_metric")]
    pub adi: f64,
}

/// Degree statistics of one scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeStats {
    pub nodes: usize,
    pub edges: usize,
    pub average_degree: f64,
    #[serde(serialize_with = "serialize_metric")]
    pub adi: f64,
    pub isolated: usize,
    /// Slugs with zero in-scope degree, sorted.
    pub isolated_slugs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted: Option<WeightedStats>,
}

impl ScopeStats {
    /// Statistics of an empty scope.
    pub fn empty() -> Self {
        Self {
            nodes: 0,
            edges: 0,
            average_degree: 0.0,
            adi: f64::INFINITY,
            isolated: 0,
            isolated_slugs: Vec::new(),
            weighted: None,
        }
    }

    /// Compute statistics for `scope` over `graph`.
    ///
    /// Weighted metrics are filled in only when the graph is weighted.
    pub fn compute(scope: &BTreeSet<&str>, graph: &AspectGraph) -> Self {
        if scope.is_empty() {
            return Self::empty();
        }

        let mut total_degree = 0usize;
        let mut total_weighted_degree = 0.0f64;
        let mut isolated_slugs = Vec::new();

        for slug in scope {
            let degree = graph
                .neighbors(slug)
                .map(|neighbors| {
                    neighbors
                        .iter()
                        .filter(|neighbor| scope.contains(neighbor.as_str()))
                        .count()
                })
                .unwrap_or(0);
            total_degree += degree;
            if degree == 0 {
                isolated_slugs.push(slug.to_string());
            }

            if let Some(neighbors) = graph.weighted_neighbors(slug) {
                total_weighted_degree += neighbors
                    .iter()
                    .filter(|(neighbor, _)| scope.contains(neighbor.as_str()))
                    .map(|(_, weight)| weight)
                    .sum::<f64>();
            }
        }

        let nodes = scope.len();
        let average_degree = total_degree as f64 / nodes as f64;
        let weighted = graph.is_weighted().then(|| {
            let average_degree = total_weighted_degree / nodes as f64;
            WeightedStats {
                edges: total_weighted_degree / 2.0,
                average_degree,
                adi: density_index(nodes, average_degree),
            }
        });

        Self {
            nodes,
            edges: total_degree / 2,
            average_degree,
            adi: density_index(nodes, average_degree),
            isolated: isolated_slugs.len(),
            isolated_slugs,
            weighted,
        }
    }

    /// The metric compared against the flood threshold: the weighted index
    /// when available and requested, otherwise the unweighted one.
    pub fn metric(&self, prefer_weighted: bool) -> (MetricKind, f64) {
        match (&self.weighted, prefer_weighted) {
            (Some(weighted), true) => (MetricKind::Weighted, weighted.adi),
            _ => (MetricKind::Unweighted, self.adi),
        }
    }
}

/// Which density index a comparison used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricKind {
    Unweighted,
    Weighted,
}

impl MetricKind {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Unweighted => "ADI",
            MetricKind::Weighted => "ADIw",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `nodes / average_degree`, infinite when the average degree is zero.
pub fn density_index(nodes: usize, average_degree: f64) -> f64 {
    if average_degree == 0.0 {
        f64::INFINITY
    } else {
        nodes as f64 / average_degree
    }
}

/// Two-decimal rendering with `inf` for the infinite sentinel.
pub fn format_metric(value: f64) -> String {
    if value.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2}", value)
    }
}

pub(crate) fn serialize_metric<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_infinite() {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_plus_one(weighted: bool) -> AspectGraph {
        let mut graph = AspectGraph::with_nodes(["a", "b", "c", "d"], weighted);
        graph.add_edge("a", "b", 0.5);
        graph.add_edge("b", "c", 0.25);
        graph.add_edge("a", "c", 1.0);
        graph
    }

    fn scope<'a>(slugs: &[&'a str]) -> BTreeSet<&'a str> {
        slugs.iter().copied().collect()
    }

    #[test]
    fn test_empty_scope() {
        let graph = triangle_plus_one(true);
        let stats = ScopeStats::compute(&BTreeSet::new(), &graph);

        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.average_degree, 0.0);
        assert!(stats.adi.is_infinite());
        assert!(stats.weighted.is_none());
    }

    #[test]
    fn test_whole_graph() {
        let graph = triangle_plus_one(false);
        let stats = ScopeStats::compute(&scope(&["a", "b", "c", "d"]), &graph);

        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.edges, 3);
        assert!((stats.average_degree - 1.5).abs() < 1e-12);
        assert!((stats.adi - 4.0 / 1.5).abs() < 1e-12);
        assert_eq!(stats.isolated_slugs, vec!["d".to_string()]);
        assert!(stats.weighted.is_none());
    }

    #[test]
    fn test_scope_ignores_outside_neighbors() {
        let graph = triangle_plus_one(true);
        let stats = ScopeStats::compute(&scope(&["a", "b", "d"]), &graph);

        assert_eq!(stats.edges, 1);
        assert_eq!(stats.isolated, 1);

        let weighted = stats.weighted.unwrap();
        assert!((weighted.edges - 0.5).abs() < 1e-12);
        assert!((weighted.average_degree - 1.0 / 3.0).abs() < 1e-12);
        assert!((weighted.adi - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_disconnected_scope_is_infinite() {
        let graph = triangle_plus_one(true);
        let stats = ScopeStats::compute(&scope(&["a", "d"]), &graph);

        assert!(stats.adi.is_infinite());
        assert!(stats.weighted.as_ref().unwrap().adi.is_infinite());
        assert_eq!(stats.isolated_slugs, vec!["a".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_degree_edge_consistency() {
        let graph = triangle_plus_one(true);
        let stats = ScopeStats::compute(&scope(&["a", "b", "c", "d"]), &graph);

        let total_degree = stats.average_degree * stats.nodes as f64;
        assert_eq!(stats.edges, (total_degree / 2.0).floor() as usize);

        let weighted = stats.weighted.unwrap();
        assert_eq!(weighted.edges, weighted.average_degree * stats.nodes as f64 / 2.0);
        assert!((weighted.edges - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_slug_counts_as_isolated() {
        let graph = triangle_plus_one(false);
        let stats = ScopeStats::compute(&scope(&["zzz"]), &graph);

        assert_eq!(stats.isolated_slugs, vec!["zzz".to_string()]);
    }

    #[test]
    fn test_metric_selection() {
        let graph = triangle_plus_one(true);
        let stats = ScopeStats::compute(&scope(&["a", "b", "c"]), &graph);

        assert_eq!(stats.metric(false).0, MetricKind::Unweighted);
        assert_eq!(stats.metric(true).0, MetricKind::Weighted);
        assert_eq!(MetricKind::Weighted.to_string(), "ADIw");
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(f64::INFINITY), "inf");
        assert_eq!(format_metric(4.5), "4.50");
        assert_eq!(format_metric(2.0 / 3.0), "0.67");
    }

    #[test]
    fn test_serialize_infinite_metric() {
        let value = serde_json::to_value(ScopeStats::empty()).unwrap();
        assert_eq!(value["adi"], "inf");
    }
}
