use super::models::{OutputFormat, RunSummary};
use crate::aggregator::{classify, AggregateReport, TraceResult};
use crate::chart::{self, Chart, ChartRenderer, JsonRenderer, SvgRenderer};
use crate::output::write_stats;
use crate::parser::{read_trace, OpType};
use crate::utils::config::AnalysisConfig;
use crate::utils::error::{BinError, RenderError, TraceError};
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Renderer for the requested artifact format
pub fn renderer_for(format: OutputFormat, out_dir: impl Into<PathBuf>) -> Box<dyn ChartRenderer> {
    match format {
        OutputFormat::Svg => Box::new(SvgRenderer::new(out_dir)),
        OutputFormat::Json => Box::new(JsonRenderer::new(out_dir)),
    }
}

/// File name of a trace, used in chart names and reports
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read and classify one trace, draw its own charts and print its statistics
///
/// Chart failures are recorded in `summary`; only read/parse errors abort.
pub fn process_trace(
    path: &Path,
    config: &AnalysisConfig,
    renderer: &mut dyn ChartRenderer,
    summary: &mut RunSummary,
) -> Result<TraceResult, TraceError> {
    let name = display_name(path);
    info!(" -- Parsing filename: {}", name);

    let events = read_trace(path)?;
    let trace = classify(&events, &config.cutoffs, name);

    for op in [OpType::Malloc, OpType::Free] {
        render_chart(
            renderer,
            chart::latency_vs_size(&trace, op, &config.binning),
            &format!("{} {} latency vs size", trace.name, op),
            summary,
        );
    }
    render_chart(
        renderer,
        chart::combined(&trace, &config.binning),
        &format!("{} combined latency", trace.name),
        summary,
    );

    let report = AggregateReport::from_trace(&trace, &config.cutoffs);
    println!("{}", report.summary());
    summary.reports.push(report);

    Ok(trace)
}

/// Render a chart if it could be built; failures only skip this chart
pub fn render_chart(
    renderer: &mut dyn ChartRenderer,
    chart: Result<Chart, BinError>,
    stage: &str,
    summary: &mut RunSummary,
) {
    let rendered = chart
        .map_err(RenderError::from)
        .and_then(|chart| renderer.render(&chart));

    match rendered {
        Ok(path) => summary.charts.push(path),
        Err(err) => {
            warn!("Skipping chart ({}): {}", stage, err);
            summary.record_failure(stage, err);
        }
    }
}

/// Write the statistics document if one was requested
pub fn write_report_if_requested(summary: &RunSummary, report: Option<&Path>) -> Result<()> {
    if let Some(path) = report {
        write_stats(&summary.reports, path).context("Failed to write statistics JSON")?;
        info!("✓ Statistics written to: {}", path.display());
    }
    Ok(())
}
