//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads and classifies one trace
//! 2. Draws latency-vs-size histograms for malloc and free
//! 3. Draws the combined latency histogram
//! 4. Prints aggregate statistics (and writes them if asked)

use super::models::{AnalyzeArgs, RunSummary};
use super::utils::{process_trace, write_report_if_requested};
use crate::chart::ChartRenderer;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
/// * `renderer` - Where charts go (SVG or JSON files)
///
/// # Returns
/// What was written and which charts were skipped. A skipped chart is not
/// an `Err`; the caller decides the exit status from `RunSummary::failures`.
///
/// # Errors
/// * Invalid configuration
/// * Unreadable, truncated or malformed trace
/// * Statistics file write errors
///
/// # Example
/// ```ignore
/// let args = AnalyzeArgs::new("traces/20180808T021350Z_tlsf.csv");
/// let mut renderer = renderer_for(OutputFormat::Svg, "traces");
/// let summary = execute_analyze(&args, renderer.as_mut())?;
/// ```
pub fn execute_analyze(args: &AnalyzeArgs, renderer: &mut dyn ChartRenderer) -> Result<RunSummary> {
    let start_time = Instant::now();

    validate_args(args)?;
    args.config
        .validate()
        .context("Invalid analysis configuration")?;

    info!("Analyzing trace: {}", args.trace.display());
    debug!(
        "Cutoffs: malloc {} cycles, free {} cycles",
        args.config.cutoffs.malloc_cutoff_cycles, args.config.cutoffs.free_cutoff_cycles
    );

    info!("Step 1/2: Parsing trace and drawing charts...");
    let mut summary = RunSummary::default();
    let trace = process_trace(&args.trace, &args.config, renderer, &mut summary)
        .with_context(|| format!("Failed to analyze {}", args.trace.display()))?;

    debug!(
        "Classified {} malloc and {} free ops",
        trace.malloc_latency.len(),
        trace.free_latency.len()
    );

    info!("Step 2/2: Writing statistics...");
    write_report_if_requested(&summary, args.report.as_deref())?;

    info!(
        "Analysis completed in {:.2}s ({} charts, {} skipped)",
        start_time.elapsed().as_secs_f64(),
        summary.charts.len(),
        summary.failures.len()
    );

    Ok(summary)
}

/// Validate analyze arguments before touching the trace
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.trace.as_os_str().is_empty() {
        bail!("Trace path is empty");
    }
    if args.trace.is_dir() {
        bail!("Trace path is a directory: {}", args.trace.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::models::OutputFormat;
    use crate::commands::utils::renderer_for;
    use std::io::Write;

    #[test]
    fn test_validate_rejects_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args = AnalyzeArgs::new(temp_dir.path());
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_missing_trace_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args = AnalyzeArgs::new(temp_dir.path().join("nope_trace.csv"));
        let mut renderer = renderer_for(OutputFormat::Json, temp_dir.path());

        assert!(execute_analyze(&args, renderer.as_mut()).is_err());
    }

    #[test]
    fn test_analyze_writes_three_charts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let trace_path = temp_dir.path().join("20180808T021350Z_tlsf.csv");
        let mut file = std::fs::File::create(&trace_path).unwrap();
        writeln!(file, "header").unwrap();
        writeln!(file, "columns").unwrap();
        writeln!(file, "malloc,1048576,1,500").unwrap();
        writeln!(file, "malloc,2097152,2,2500").unwrap();
        writeln!(file, "free,1048576,1,900").unwrap();
        drop(file);

        let args = AnalyzeArgs::new(&trace_path);
        let out_dir = temp_dir.path().join("out");
        let mut renderer = renderer_for(OutputFormat::Json, &out_dir);

        let summary = execute_analyze(&args, renderer.as_mut()).unwrap();

        assert!(summary.is_success(), "{:?}", summary.failures);
        assert_eq!(summary.charts.len(), 3);
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].malloc_spikes, 1);
        assert_eq!(summary.reports[0].free_spikes, 1);
        assert!(out_dir
            .join("20180808T021350Z_tlsf.csv_malloc_chunk_vs_cycles.json")
            .exists());
    }
}
