use crate::aggregator::AggregateReport;
use crate::utils::config::AnalysisConfig;
use clap::ValueEnum;
use std::path::PathBuf;

/// Chart artifact format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Hand-drawn SVG histograms
    #[default]
    Svg,
    /// Bin edges and counts as JSON
    Json,
}

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Trace file to analyze
    pub trace: PathBuf,

    /// Where to write aggregate statistics JSON (optional)
    pub report: Option<PathBuf>,

    /// Cutoffs and binning for this run
    pub config: AnalysisConfig,
}

impl AnalyzeArgs {
    pub fn new(trace: impl Into<PathBuf>) -> Self {
        Self {
            trace: trace.into(),
            report: None,
            config: AnalysisConfig::default(),
        }
    }
}

/// Arguments for the compare command
#[derive(Debug, Clone)]
pub struct CompareArgs {
    /// (allocator label, trace path), in legend order
    pub traces: Vec<(String, PathBuf)>,

    /// Require matching run tokens. `None` picks the default for the
    /// number of traces: off for two, on for three.
    pub same_run: Option<bool>,

    pub report: Option<PathBuf>,

    pub config: AnalysisConfig,
}

impl CompareArgs {
    pub fn same_run(&self) -> bool {
        self.same_run.unwrap_or(self.traces.len() == 3)
    }
}

/// What a command produced and what went wrong along the way
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Artifacts written by the renderer
    pub charts: Vec<PathBuf>,

    /// One per successfully parsed trace
    pub reports: Vec<AggregateReport>,

    /// Non-fatal failures (skipped charts, unreadable traces), with context
    pub failures: Vec<String>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record_failure(&mut self, stage: &str, err: impl std::fmt::Display) {
        self.failures.push(format!("{}: {}", stage, err));
    }
}
