//! `adi` - Aspect-Density Index command line.

use anyhow::Context;
use aspect_density::{AnalysisConfig, DensityAnalyzer};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Calculate the Aspect-Density Index (ADI) for ASPECTS.json.
#[derive(Parser)]
#[command(name = "adi")]
#[command(version)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Path to the ASPECTS.json file.
    aspects_path: PathBuf,

    /// Calculate ADI for each section in addition to the global value.
    #[arg(long)]
    per_section: bool,

    /// Treat explicit slug mentions in names/descriptions as additional connections.
    #[arg(long)]
    include_slug_links: bool,

    /// Treat shared source file paths as links between aspects.
    #[arg(long)]
    include_source_links: bool,

    /// Optional path to ASPECTS.tags.json for cached tag reference counts.
    #[arg(long, value_name = "PATH")]
    tags_catalog: Option<PathBuf>,

    /// Ignore tags that appear in at least this fraction of entries (e.g. 0.15).
    #[arg(long, value_name = "FRACTION")]
    ignore_tag_frac: Option<f64>,

    /// Calculate weighted ADI using inverse-frequency weights for tag links.
    #[arg(long)]
    weighted: bool,

    /// Exponent of the tag weight denominator: weight = 1/log2(1+freq)^gamma [default: 1.0]
    #[arg(long, value_name = "GAMMA")]
    idf_gamma: Option<f64>,

    /// Warn when ADI is greater than or equal to this value [default: 4.0]
    #[arg(long, value_name = "THRESHOLD")]
    adi_threshold: Option<f64>,

    /// List isolated aspects (zero degree).
    #[arg(long)]
    show_isolates: bool,

    /// Maximum number of isolates to list per scope.
    #[arg(long, value_name = "N")]
    isolate_limit: Option<usize>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// TOML file with default analysis options.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run in verbose mode
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Start from the config file (if any) and apply command-line overrides.
    fn resolve_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };

        config.per_section |= self.per_section;
        config.include_slug_links |= self.include_slug_links;
        config.include_source_links |= self.include_source_links;
        config.weighted |= self.weighted;
        config.show_isolates |= self.show_isolates;

        if self.tags_catalog.is_some() {
            config.tags_catalog = self.tags_catalog.clone();
        }
        if self.ignore_tag_frac.is_some() {
            config.ignore_tag_frac = self.ignore_tag_frac;
        }
        if let Some(gamma) = self.idf_gamma {
            config.idf_gamma = gamma;
        }
        if let Some(threshold) = self.adi_threshold {
            config.adi_threshold = threshold;
        }
        if self.isolate_limit.is_some() {
            config.isolate_limit = self.isolate_limit;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; warnings go to stderr next to the report on stdout.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let config = cli.resolve_config()?;
    tracing::debug!("Resolved configuration: {:?}", config);

    let analyzer = DensityAnalyzer::new(config);
    let report = analyzer
        .run(&cli.aspects_path)
        .with_context(|| format!("ADI analysis of {} failed", cli.aspects_path.display()))?;

    match cli.format {
        OutputFormat::Text => print!("{}", report.text(&analyzer.config().report_options())),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
