//! Chart requests handed to a renderer.
//!
//! A `Chart` carries the series to draw, the bin edges to bucket them with,
//! per-bin labels and title metadata. Renderers decide format and location.

use crate::aggregator::TraceResult;
use crate::binning::{BinSpec, Histogram, Histogram2d, Sample};
use crate::parser::OpType;
use crate::run::RunToken;
use crate::utils::config::BinningConfig;
use crate::utils::error::BinError;
use serde::Serialize;

/// What the chart shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// 2D histogram of latency (x) against chunk size (y) for one op type
    LatencyVsSize,
    /// Overlaid malloc and free latency densities of one trace
    Combined,
    /// Overlaid latencies of one op type across allocators, log-spaced bins
    LogComparison,
}

/// Samples drawn under one legend entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSeries {
    pub label: String,
    pub values: Vec<f64>,
}

impl LabeledSeries {
    pub fn new<T: Sample>(label: impl Into<String>, values: &[T]) -> Self {
        Self {
            label: label.into(),
            values: values.iter().map(|v| v.value()).collect(),
        }
    }
}

/// One chart to render
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,

    /// Output file name without extension
    pub file_stem: String,

    pub title: String,
    pub x_label: String,
    pub y_label: String,

    /// For `LatencyVsSize`: `[latency, size]`. Otherwise one entry per
    /// overlaid histogram.
    pub series: Vec<LabeledSeries>,

    pub x_bins: BinSpec,
    pub y_bins: Option<BinSpec>,

    /// Per-bin tick labels for the x axis (terminal bin overflow-marked)
    pub x_tick_labels: Vec<String>,

    /// Plot densities instead of raw counts
    pub density: bool,
}

impl Chart {
    pub fn is_2d(&self) -> bool {
        self.kind == ChartKind::LatencyVsSize
    }

    /// 1D counts for every series over the x bins
    pub fn histograms(&self) -> Vec<Histogram> {
        self.series
            .iter()
            .map(|s| Histogram::from_series(&s.values, &self.x_bins))
            .collect()
    }

    /// Joint counts of the first two series, if this is a 2D chart
    pub fn histogram_2d(&self) -> Option<Result<Histogram2d, BinError>> {
        let y_bins = self.y_bins.as_ref()?;
        let [x, y] = self.series.as_slice() else {
            return None;
        };
        Some(Histogram2d::from_series(
            &x.values,
            &y.values,
            &self.x_bins,
            y_bins,
        ))
    }
}

/// Latency-vs-size chart for one op type of one trace
///
/// Each axis is binned independently with `BinSpec::mean_scaled`.
///
/// # Errors
/// * `BinError::InvalidRange` - No events of this op type, or all zero
pub fn latency_vs_size(
    trace: &TraceResult,
    op: OpType,
    binning: &BinningConfig,
) -> Result<Chart, BinError> {
    let latency = trace.latency(op);
    let size = trace.size(op);

    let x_bins = BinSpec::mean_scaled(latency, binning.hist2d_bins)?;
    let y_bins = BinSpec::mean_scaled(size, binning.hist2d_bins)?;

    Ok(Chart {
        kind: ChartKind::LatencyVsSize,
        file_stem: format!("{}_{}_chunk_vs_cycles", trace.name, op),
        title: format!("{} {} ops", size.len(), op),
        x_label: "Cycles spent".to_string(),
        y_label: "Block size (MB)".to_string(),
        series: vec![
            LabeledSeries::new("cycles", latency),
            LabeledSeries::new("size_mib", size),
        ],
        x_tick_labels: x_bins.labels(),
        x_bins,
        y_bins: Some(y_bins),
        density: false,
    })
}

/// Malloc and free latency densities of one trace on shared bins
///
/// # Errors
/// * `BinError::InvalidRange` - Either op type has no events
pub fn combined(trace: &TraceResult, binning: &BinningConfig) -> Result<Chart, BinError> {
    let malloc = trace.latency(OpType::Malloc);
    let free = trace.latency(OpType::Free);

    let x_bins = BinSpec::shared_range(
        &[malloc, free],
        binning.combined_bins,
        binning.rounding_base,
    )?;

    Ok(Chart {
        kind: ChartKind::Combined,
        file_stem: trace.name.clone(),
        title: format!("cpu cycles for total ops: {}", trace.total_ops()),
        x_label: "cycles spent".to_string(),
        y_label: "density".to_string(),
        series: vec![
            LabeledSeries::new(OpType::Malloc.as_str(), malloc),
            LabeledSeries::new(OpType::Free.as_str(), free),
        ],
        x_tick_labels: x_bins.labels(),
        x_bins,
        y_bins: None,
        density: true,
    })
}

/// Latencies of one op type across allocator traces, log-spaced bins
///
/// The bins span every trace, so swapping traces only swaps legend entries.
///
/// # Errors
/// * `BinError::InvalidRange` - No samples, or the smallest latency is 0
pub fn log_comparison(
    token: &RunToken,
    traces: &[(&str, &TraceResult)],
    op: OpType,
    binning: &BinningConfig,
) -> Result<Chart, BinError> {
    let series_set: Vec<&[u64]> = traces.iter().map(|(_, t)| t.latency(op)).collect();
    let x_bins = BinSpec::log_span(&series_set, binning.log_bins)?;

    let labels: Vec<&str> = traces.iter().map(|(label, _)| *label).collect();
    let lead_count = series_set.first().map(|s| s.len()).unwrap_or(0);

    Ok(Chart {
        kind: ChartKind::LogComparison,
        file_stem: format!("{}_{}_{}_op_hist_plot", token, labels.join("_vs_"), op),
        title: format!("{} {} ops latency in cycles [log scale]", lead_count, op),
        x_label: "cycles spent (log scale)".to_string(),
        y_label: "op count".to_string(),
        series: traces
            .iter()
            .map(|(label, trace)| LabeledSeries::new(*label, trace.latency(op)))
            .collect(),
        x_tick_labels: x_bins.labels(),
        x_bins,
        y_bins: None,
        density: false,
    })
}
