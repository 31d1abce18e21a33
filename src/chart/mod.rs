//! Chart requests and the renderers that turn them into artifacts.
//!
//! The analysis only builds `Chart` values. Anything implementing
//! `ChartRenderer` can consume them: the SVG and JSON renderers here, or a
//! recording renderer in tests.

pub mod model;
pub mod svg;

use crate::binning::{BinSpec, Histogram};
use crate::output::write_json;
use crate::utils::error::RenderError;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

// Re-export main types
pub use model::{combined, latency_vs_size, log_comparison, Chart, ChartKind, LabeledSeries};
pub use svg::{generate_chart_svg, SvgConfig, SvgRenderer};

/// Consumes chart requests and produces artifacts
pub trait ChartRenderer {
    /// Render one chart, returning where the artifact went
    fn render(&mut self, chart: &Chart) -> Result<PathBuf, RenderError>;
}

/// Writes `<out_dir>/<file_stem>.json` with bin edges and per-series counts
///
/// Raw samples are not written, only what a plotting front end needs.
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    out_dir: PathBuf,
}

impl JsonRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

/// Serialized form of a rendered chart
#[derive(Debug, Serialize)]
pub struct ChartData<'a> {
    pub kind: ChartKind,
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub x_bins: &'a BinSpec,
    pub x_tick_labels: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_bins: Option<&'a BinSpec>,
    pub series: Vec<SeriesData<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts_2d: Option<Vec<Vec<u64>>>,
}

#[derive(Debug, Serialize)]
pub struct SeriesData<'a> {
    pub label: &'a str,
    pub samples: usize,
    #[serde(flatten)]
    pub histogram: Histogram,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<Vec<f64>>,
}

impl<'a> ChartData<'a> {
    pub fn from_chart(chart: &'a Chart) -> Result<Self, RenderError> {
        if chart.series.is_empty() {
            return Err(RenderError::EmptyChart(chart.file_stem.clone()));
        }

        let counts_2d = match chart.histogram_2d() {
            Some(hist) => Some(hist?.counts),
            None if chart.is_2d() => return Err(RenderError::MissingAxis(chart.file_stem.clone())),
            None => None,
        };

        // 2D charts carry their counts in `counts_2d`
        let series = if chart.is_2d() {
            Vec::new()
        } else {
            chart
                .series
                .iter()
                .zip(chart.histograms())
                .map(|(series, histogram)| SeriesData {
                    label: &series.label,
                    samples: series.values.len(),
                    density: chart.density.then(|| histogram.density(&chart.x_bins)),
                    histogram,
                })
                .collect()
        };

        Ok(Self {
            kind: chart.kind,
            title: &chart.title,
            x_label: &chart.x_label,
            y_label: &chart.y_label,
            x_bins: &chart.x_bins,
            x_tick_labels: &chart.x_tick_labels,
            y_bins: chart.y_bins.as_ref(),
            series,
            counts_2d,
        })
    }
}

impl ChartRenderer for JsonRenderer {
    fn render(&mut self, chart: &Chart) -> Result<PathBuf, RenderError> {
        let data = ChartData::from_chart(chart)?;
        let path = self.out_dir.join(format!("{}.json", chart.file_stem));

        info!(" ** Info saving: {} to path: {}", chart.file_stem, self.out_dir.display());
        write_json(&data, &path)?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::TraceResult;
    use crate::parser::OpType;
    use crate::utils::config::BinningConfig;

    fn trace() -> TraceResult {
        TraceResult {
            name: "run_native.csv".to_string(),
            malloc_latency: vec![500, 2500],
            malloc_size: vec![1.0, 2.0],
            free_latency: vec![900],
            free_size: vec![1.0],
            malloc_spikes: 1,
            free_spikes: 1,
        }
    }

    #[test]
    fn test_json_renderer_writes_counts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut renderer = JsonRenderer::new(temp_dir.path());
        let chart = combined(&trace(), &BinningConfig::default()).unwrap();

        let path = renderer.render(&chart).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(value["kind"], "combined");
        assert_eq!(value["series"][0]["label"], "malloc");
        assert_eq!(value["series"][0]["total"], 2);
        assert!(value["series"][1]["density"].is_array());
        assert!(value.get("counts_2d").is_none());
    }

    #[test]
    fn test_chart_data_2d() {
        let chart = latency_vs_size(&trace(), OpType::Malloc, &BinningConfig::default()).unwrap();
        let data = ChartData::from_chart(&chart).unwrap();

        let counts = data.counts_2d.unwrap();
        assert_eq!(counts.len(), 39);
        assert_eq!(counts.iter().flatten().sum::<u64>(), 2);
        assert!(data.series.is_empty());
    }
}
