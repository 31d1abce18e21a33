//! Compare command implementation.
//!
//! The compare command:
//! 1. Checks the traces belong to one benchmark run (when required)
//! 2. Analyzes each trace on its own, like `analyze`
//! 3. Overlays malloc and free latencies of all traces on log-spaced bins

use super::models::{CompareArgs, RunSummary};
use super::utils::{display_name, process_trace, render_chart, write_report_if_requested};
use crate::aggregator::TraceResult;
use crate::chart::{log_comparison, ChartRenderer};
use crate::parser::OpType;
use crate::run::{verify_same_run, LabeledTrace};
use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::time::Instant;

/// Execute the compare command
///
/// **Public** - main entry point called from main.rs
///
/// A trace that fails to parse is reported and left out; the comparison
/// still runs as long as two traces remain.
///
/// # Errors
/// * Fewer than two or more than three traces
/// * Run tokens differ while the same-run check is on
/// * Statistics file write errors
pub fn execute_compare(args: &CompareArgs, renderer: &mut dyn ChartRenderer) -> Result<RunSummary> {
    let start_time = Instant::now();

    validate_args(args)?;
    args.config
        .validate()
        .context("Invalid analysis configuration")?;

    let labels: Vec<&str> = args.traces.iter().map(|(label, _)| label.as_str()).collect();
    info!("Comparing allocators: {}", labels.join(", "));

    // Step 1: Same-run check, before anything is parsed
    info!("Step 1/4: Checking run tokens...");
    let labeled: Vec<LabeledTrace<'_>> = args
        .traces
        .iter()
        .map(|(label, path)| LabeledTrace::new(label, path))
        .collect();
    let token = verify_same_run(&labeled, args.same_run())
        .context("Traces are not from the same benchmark run")?;
    info!("Run token: {}", token);

    // Step 2: Per-trace analysis
    info!("Step 2/4: Parsing traces...");
    let mut summary = RunSummary::default();
    let mut parsed: Vec<(&str, TraceResult)> = Vec::with_capacity(args.traces.len());
    for (label, path) in &args.traces {
        match process_trace(path, &args.config, renderer, &mut summary) {
            Ok(trace) => parsed.push((label.as_str(), trace)),
            Err(err) => {
                warn!("Leaving {} out of the comparison: {}", display_name(path), err);
                summary.record_failure(label, err);
            }
        }
    }

    // Step 3: Comparison charts
    if parsed.len() >= 2 {
        info!("Step 3/4: Drawing comparison charts...");
        let traces: Vec<(&str, &TraceResult)> =
            parsed.iter().map(|(label, trace)| (*label, trace)).collect();
        let compared: Vec<&str> = traces.iter().map(|(label, _)| *label).collect();

        for op in [OpType::Malloc, OpType::Free] {
            render_chart(
                renderer,
                log_comparison(&token, &traces, op, &args.config.binning),
                &format!("{} comparison of {}", op, compared.join(" vs ")),
                &mut summary,
            );
        }
    } else {
        warn!(
            "Step 3/4: Skipping comparison, only {} of {} traces parsed",
            parsed.len(),
            args.traces.len()
        );
        summary.record_failure(
            "comparison",
            format!("needs two parsed traces, got {}", parsed.len()),
        );
    }

    // Step 4: Statistics
    info!("Step 4/4: Writing statistics...");
    write_report_if_requested(&summary, args.report.as_deref())?;

    info!(
        "Comparison completed in {:.2}s ({} charts, {} failures)",
        start_time.elapsed().as_secs_f64(),
        summary.charts.len(),
        summary.failures.len()
    );

    Ok(summary)
}

/// Validate compare arguments
pub fn validate_args(args: &CompareArgs) -> Result<()> {
    if !(2..=3).contains(&args.traces.len()) {
        bail!(
            "Comparison needs two or three traces, got {}",
            args.traces.len()
        );
    }
    for (label, path) in &args.traces {
        if path.as_os_str().is_empty() {
            bail!("Trace path for {} is empty", label);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::AnalysisConfig;
    use std::path::PathBuf;

    fn args(traces: &[(&str, &str)], same_run: Option<bool>) -> CompareArgs {
        CompareArgs {
            traces: traces
                .iter()
                .map(|(label, path)| (label.to_string(), PathBuf::from(path)))
                .collect(),
            same_run,
            report: None,
            config: AnalysisConfig::default(),
        }
    }

    #[test]
    fn test_validate_trace_count() {
        assert!(validate_args(&args(&[("tlsf", "a_x.csv")], None)).is_err());
        assert!(validate_args(&args(&[("tlsf", "a_x.csv"), ("native", "a_y.csv")], None)).is_ok());
    }

    #[test]
    fn test_same_run_defaults() {
        let two = args(&[("tlsf", "a_x.csv"), ("native", "b_y.csv")], None);
        assert!(!two.same_run());

        let three = args(
            &[("tlsf", "a_x.csv"), ("tlsf_ori", "a_y.csv"), ("native", "a_z.csv")],
            None,
        );
        assert!(three.same_run());

        let forced = args(&[("tlsf", "a_x.csv"), ("native", "b_y.csv")], Some(true));
        assert!(forced.same_run());
    }

    #[test]
    fn test_mismatch_aborts_before_parsing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut renderer = crate::commands::utils::renderer_for(
            crate::commands::models::OutputFormat::Json,
            temp_dir.path(),
        );
        // Neither file exists; the token check must fail first.
        let compare = args(
            &[("tlsf", "20180808T021350Z_tlsf.csv"), ("native", "20180909T000000Z_native.csv")],
            Some(true),
        );

        let err = execute_compare(&compare, renderer.as_mut()).unwrap_err();
        assert!(err.to_string().contains("same benchmark run"));
    }
}
