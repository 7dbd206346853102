//! Scope aggregation and reporting.
//!
//! The analyzer drives one run end to end:
//! 1. **Load**: read the tag catalog and the ASPECTS document
//! 2. **Build**: construct the relationship graph once
//! 3. **Measure**: compute statistics for the overall scope and, optionally,
//!    every section
//! 4. **Flag**: compare each scope's density index against the threshold

use aspect_model::{AspectsDocument, EntrySet, TagCatalog};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::config::AnalysisConfig;
use crate::density::{format_metric, serialize_metric, MetricKind, ScopeStats};
use crate::error::DensityError;
use crate::knowledge_base::{build_graph, AspectGraph, TagReconciler};

/// Controls for the isolate listings of the text report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub show_isolates: bool,
    pub isolate_limit: Option<usize>,
}

/// Statistics of one scope plus the threshold verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeReport {
    pub name: String,
    pub stats: ScopeStats,
    pub metric: MetricKind,
    #[serde(serialize_with = "serialize_metric")]
    pub value: f64,
    pub flagged: bool,
}

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityReport {
    #[serde(serialize_with = "serialize_metric")]
    pub threshold: f64,
    pub overall: ScopeReport,
    /// Present when per-section statistics were requested, sorted by section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<ScopeReport>>,
    /// Reconciler warnings, in emission order.
    pub warnings: Vec<String>,
}

impl DensityReport {
    /// Sections whose metric reached the threshold.
    pub fn flagged_sections(&self) -> impl Iterator<Item = &ScopeReport> {
        self.sections.iter().flatten().filter(|scope| scope.flagged)
    }

    /// Whether the overall scope or any section was flagged.
    pub fn any_flagged(&self) -> bool {
        self.overall.flagged || self.flagged_sections().next().is_some()
    }

    /// Human-readable rendering.
    pub fn text<'a>(&'a self, options: &'a ReportOptions) -> TextReport<'a> {
        TextReport {
            report: self,
            options,
        }
    }

    pub fn to_json(&self) -> Result<String, DensityError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the density analysis for a configuration.
pub struct DensityAnalyzer {
    config: AnalysisConfig,
}

impl DensityAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Create an analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AnalysisConfig::default())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the configured catalog and the document at `aspects_path`, then
    /// analyze them.
    pub fn run(&self, aspects_path: &Path) -> Result<DensityReport, DensityError> {
        self.config.validate()?;

        let catalog = match &self.config.tags_catalog {
            Some(path) => TagCatalog::load(path)?,
            None => None,
        };
        let document = AspectsDocument::load(aspects_path)?;
        let entries = EntrySet::from_document(document)?;

        self.analyze(&entries, catalog.as_ref())
    }

    /// Build the graph for `entries` and measure every requested scope.
    pub fn analyze(
        &self,
        entries: &EntrySet,
        catalog: Option<&TagCatalog>,
    ) -> Result<DensityReport, DensityError> {
        if entries.is_empty() {
            return Err(DensityError::NoEntries);
        }

        let mut reconciler = TagReconciler::new(catalog);
        let graph = build_graph(entries, &self.config.graph_options(), &mut reconciler)?;
        let warnings = reconciler.finish();

        let overall = self.measure("Overall", &entries.slugs(), &graph);
        let sections = self.config.per_section.then(|| {
            entries
                .sections()
                .iter()
                .map(|(section, slugs)| self.measure(section, slugs, &graph))
                .collect()
        });

        Ok(DensityReport {
            threshold: self.config.adi_threshold,
            overall,
            sections,
            warnings,
        })
    }

    fn measure(&self, name: &str, scope: &BTreeSet<&str>, graph: &AspectGraph) -> ScopeReport {
        let stats = ScopeStats::compute(scope, graph);
        let (metric, value) = stats.metric(self.config.weighted);
        let flagged = value >= self.config.adi_threshold || value.is_infinite();
        if flagged {
            tracing::debug!("Scope '{}' flagged: {} = {}", name, metric, format_metric(value));
        }
        ScopeReport {
            name: name.to_string(),
            stats,
            metric,
            value,
            flagged,
        }
    }
}

/// Text rendering of a [`DensityReport`].
pub struct TextReport<'a> {
    report: &'a DensityReport,
    options: &'a ReportOptions,
}

impl TextReport<'_> {
    fn isolates<'s>(&self, stats: &'s ScopeStats) -> (&'s [String], usize) {
        let limit = self
            .options
            .isolate_limit
            .unwrap_or(stats.isolated_slugs.len())
            .min(stats.isolated_slugs.len());
        (&stats.isolated_slugs[..limit], stats.isolated - limit)
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let overall = &report.overall;

        write_summary(f, &overall.name, &overall.stats)?;
        if overall.flagged {
            writeln!(
                f,
                "!! Overall {} {} >= threshold {:.2}",
                overall.metric,
                format_metric(overall.value),
                report.threshold
            )?;
        }
        let overall_isolates_shown = self.options.show_isolates && overall.stats.isolated > 0;
        if overall_isolates_shown {
            writeln!(f, "  Isolated aspects:")?;
            let (shown, remaining) = self.isolates(&overall.stats);
            for slug in shown {
                writeln!(f, "    - {}", slug)?;
            }
            if remaining > 0 {
                writeln!(f, "    ... ({} more)", remaining)?;
            }
        }

        if let Some(sections) = &report.sections {
            writeln!(f)?;
            writeln!(f, "Per section:")?;
            for section in sections {
                write_summary(f, &format!("  {}", section.name), &section.stats)?;
                if self.options.show_isolates && section.stats.isolated > 0 {
                    let (shown, remaining) = self.isolates(&section.stats);
                    for slug in shown {
                        writeln!(f, "    * isolated: {}", slug)?;
                    }
                    if remaining > 0 {
                        writeln!(f, "    * ... ({} more)", remaining)?;
                    }
                }
            }

            let mut flagged = report.flagged_sections().peekable();
            if flagged.peek().is_some() {
                writeln!(f)?;
                writeln!(f, "Sections exceeding threshold:")?;
                for section in flagged {
                    writeln!(
                        f,
                        "  - {}: {}={}, avg_degree={}, isolated={}",
                        section.name,
                        section.metric,
                        format_metric(section.value),
                        format_metric(section.stats.average_degree),
                        section.stats.isolated
                    )?;
                }
            }
        }

        if !report.any_flagged() && !overall_isolates_shown {
            writeln!(f)?;
            writeln!(f, "ADI within target thresholds; no high-risk sections detected.")?;
        }
        Ok(())
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, title: &str, stats: &ScopeStats) -> fmt::Result {
    write!(
        f,
        "{}: aspects={}, edges={}, avg_degree={}, ADI={}, isolated={}",
        title,
        stats.nodes,
        stats.edges,
        format_metric(stats.average_degree),
        format_metric(stats.adi),
        stats.isolated
    )?;
    if let Some(weighted) = &stats.weighted {
        write!(
            f,
            ", weighted_avg_degree={}, ADIw={}",
            format_metric(weighted.average_degree),
            format_metric(weighted.adi)
        )?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect_model::Entry;

    fn entries() -> EntrySet {
        EntrySet::from_entries(vec![
            Entry::new("a", "core").with_tag("x"),
            Entry::new("b", "core").with_tag("x"),
            Entry::new("c", "misc").with_tag("y"),
        ])
        .unwrap()
    }

    fn analyze(config: AnalysisConfig) -> DensityReport {
        DensityAnalyzer::new(config).analyze(&entries(), None).unwrap()
    }

    #[test]
    fn test_empty_entries_rejected() {
        let empty = EntrySet::from_entries(Vec::new()).unwrap();
        let err = DensityAnalyzer::with_defaults().analyze(&empty, None).unwrap_err();

        assert!(matches!(err, DensityError::NoEntries));
    }

    #[test]
    fn test_overall_flagged_at_threshold() {
        let report = analyze(AnalysisConfig::default());

        assert!((report.overall.value - 4.5).abs() < 1e-9);
        assert!(report.overall.flagged);
        assert!(report.sections.is_none());
    }

    #[test]
    fn test_overall_below_threshold() {
        let report = analyze(AnalysisConfig {
            adi_threshold: 5.0,
            ..AnalysisConfig::default()
        });

        assert!(!report.overall.flagged);
        assert!(!report.any_flagged());
    }

    #[test]
    fn test_per_section_reports() {
        let report = analyze(AnalysisConfig {
            per_section: true,
            adi_threshold: 5.0,
            ..AnalysisConfig::default()
        });

        let sections = report.sections.as_ref().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "core");
        assert!((sections[0].value - 2.0).abs() < 1e-9);
        assert!(!sections[0].flagged);
        // A lone entry has no in-section edges, so its index is infinite.
        assert_eq!(sections[1].name, "misc");
        assert!(sections[1].value.is_infinite());
        assert!(sections[1].flagged);

        let flagged: Vec<_> = report.flagged_sections().map(|s| s.name.as_str()).collect();
        assert_eq!(flagged, vec!["misc"]);
    }

    #[test]
    fn test_weighted_metric_compared() {
        let report = analyze(AnalysisConfig {
            weighted: true,
            adi_threshold: 100.0,
            ..AnalysisConfig::default()
        });

        assert_eq!(report.overall.metric, MetricKind::Weighted);
        let weighted = report.overall.stats.weighted.as_ref().unwrap();
        assert_eq!(report.overall.value, weighted.adi);
        // ADIw = 3 / (2 / (3 * log2(3)))
        assert!((report.overall.value - 4.5 * 3f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn test_text_report_layout() {
        let report = analyze(AnalysisConfig {
            per_section: true,
            ..AnalysisConfig::default()
        });
        let text = report.text(&ReportOptions::default()).to_string();

        let expected = "\
Overall: aspects=3, edges=1, avg_degree=0.67, ADI=4.50, isolated=1
!! Overall ADI 4.50 >= threshold 4.00

Per section:
  core: aspects=2, edges=1, avg_degree=1.00, ADI=2.00, isolated=0
  misc: aspects=1, edges=0, avg_degree=0.00, ADI=inf, isolated=1

Sections exceeding threshold:
  - misc: ADI=inf, avg_degree=0.00, isolated=1
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_text_report_all_clear() {
        let report = analyze(AnalysisConfig {
            adi_threshold: 10.0,
            ..AnalysisConfig::default()
        });
        let text = report.text(&ReportOptions::default()).to_string();

        assert!(text.ends_with("\nADI within target thresholds; no high-risk sections detected.\n"));
    }

    #[test]
    fn test_text_report_isolates_limited() {
        let entries = EntrySet::from_entries(vec![
            Entry::new("a", "s"),
            Entry::new("b", "s"),
            Entry::new("c", "s"),
        ])
        .unwrap();
        let config = AnalysisConfig {
            per_section: true,
            ..AnalysisConfig::default()
        };
        let report = DensityAnalyzer::new(config).analyze(&entries, None).unwrap();
        let options = ReportOptions {
            show_isolates: true,
            isolate_limit: Some(2),
        };
        let text = report.text(&options).to_string();

        assert!(text.contains("  Isolated aspects:\n    - a\n    - b\n    ... (1 more)\n"));
        assert!(text.contains("    * isolated: a\n    * isolated: b\n    * ... (1 more)\n"));
        assert!(!text.contains("within target thresholds"));
    }

    #[test]
    fn test_json_report() {
        let report = analyze(AnalysisConfig {
            per_section: true,
            ..AnalysisConfig::default()
        });
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["overall"]["name"], "Overall");
        assert_eq!(value["overall"]["metric"], "Unweighted");
        assert_eq!(value["sections"][1]["value"], "inf");
        assert_eq!(value["sections"][1]["stats"]["adi"], "inf");
    }

    #[test]
    fn test_json_infinite_threshold() {
        let report = analyze(AnalysisConfig {
            adi_threshold: f64::INFINITY,
            ..AnalysisConfig::default()
        });
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["threshold"], "inf");
        assert!(!report.overall.flagged);
    }
}
