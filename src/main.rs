//! Alloc Trace Studio CLI
//!
//! Latency histograms and spike statistics for allocator traces.

use alloc_trace_studio::commands::{
    execute_analyze, execute_compare, renderer_for, AnalyzeArgs, CompareArgs, OutputFormat,
    RunSummary,
};
use alloc_trace_studio::utils::config::{load_config, AnalysisConfig};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;

/// Alloc Trace Studio - latency analysis for allocator traces
#[derive(Parser, Debug)]
#[command(name = "alloc-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Malloc spike threshold in cycles
    #[arg(short, long, global = true)]
    malloc_cutoff: Option<f64>,

    /// Free spike threshold in cycles
    #[arg(short, long, global = true)]
    free_cutoff: Option<f64>,

    /// Directory charts are written to
    #[arg(short, long, global = true, default_value = "./traces")]
    out_dir: PathBuf,

    /// TOML file with cutoffs and binning settings
    #[arg(long, global = true, env = "ALLOC_TRACE_CONFIG")]
    config: Option<PathBuf>,

    /// Chart artifact format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Svg)]
    format: OutputFormat,

    /// Write aggregate statistics JSON to this path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a single trace
    Analyze {
        /// Trace file (two preamble lines, then op,size,block,cycles rows)
        trace: PathBuf,
    },

    /// Compare two or three allocator traces from one run
    Compare {
        /// TLSF allocator trace
        #[arg(long)]
        tlsf: Option<PathBuf>,

        /// Original TLSF allocator trace
        #[arg(long)]
        tlsf_ori: Option<PathBuf>,

        /// Native allocator trace
        #[arg(long)]
        native: Option<PathBuf>,

        /// Require all traces to share a run token [default: true for three traces, false for two]
        #[arg(long)]
        same_run: Option<bool>,
    },
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = build_config(&cli)?;
    info!("Using output directory: {}", cli.out_dir.display());
    let mut renderer = renderer_for(cli.format, &cli.out_dir);

    // Execute command
    let summary = match cli.command {
        Commands::Analyze { trace } => {
            let args = AnalyzeArgs {
                trace,
                report: cli.report,
                config,
            };
            execute_analyze(&args, renderer.as_mut())?
        }

        Commands::Compare {
            tlsf,
            tlsf_ori,
            native,
            same_run,
        } => {
            let traces: Vec<(String, PathBuf)> = [
                ("tlsf", tlsf),
                ("tlsf_ori", tlsf_ori),
                ("native", native),
            ]
            .into_iter()
            .filter_map(|(label, path)| path.map(|p| (label.to_string(), p)))
            .collect();
            let args = CompareArgs {
                traces,
                same_run,
                report: cli.report,
                config,
            };
            execute_compare(&args, renderer.as_mut())?
        }
    };

    finish(&summary)
}

/// Config file (or defaults) with command-line cutoffs applied on top
///
/// **Private** - internal helper for main
fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let base = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let config = base.with_cutoff_overrides(cli.malloc_cutoff, cli.free_cutoff);
    config.validate().context("Invalid analysis configuration")?;
    Ok(config)
}

/// Report written charts and turn recorded failures into a non-zero exit
///
/// **Private** - internal helper for main
fn finish(summary: &RunSummary) -> Result<()> {
    for chart in &summary.charts {
        println!("✓ Chart written to: {}", chart.display());
    }

    if !summary.is_success() {
        for failure in &summary.failures {
            error!("{}", failure);
        }
        bail!("{} step(s) failed", summary.failures.len());
    }

    Ok(())
}
