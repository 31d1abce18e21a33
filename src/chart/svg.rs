//! SVG histogram rendering.
//!
//! Hand-written SVG, no plotting backend:
//! - 1D charts: grouped bars per bin, linear or log x axis
//! - 2D charts: heat map cells shaded by count

use super::model::Chart;
use super::ChartRenderer;
use crate::binning::{format_edge, BinSpec};
use crate::output::write_svg;
use crate::utils::error::RenderError;
use log::{debug, info};
use std::path::{Path, PathBuf};

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 70.0;

/// Max x tick labels before thinning
const MAX_TICKS: usize = 20;

const PALETTE: &[&str] = &["#0087ab", "#a7cbeb", "#f28e2b", "#59a14f", "#e15759"];

/// SVG canvas configuration
#[derive(Debug, Clone)]
pub struct SvgConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 500,
        }
    }
}

/// Writes `<out_dir>/<file_stem>.svg`, replacing any existing file
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    out_dir: PathBuf,
    config: SvgConfig,
}

impl SvgRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            config: SvgConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SvgConfig) -> Self {
        self.config = config;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&mut self, chart: &Chart) -> Result<PathBuf, RenderError> {
        let svg = generate_chart_svg(chart, &self.config)?;
        let path = self.out_dir.join(format!("{}.svg", chart.file_stem));

        info!(" ** Info saving: {} to path: {}", chart.file_stem, self.out_dir.display());
        write_svg(&svg, &path)?;

        Ok(path)
    }
}

/// Generate the SVG document for a chart
///
/// # Errors
/// * `RenderError::EmptyChart` - No series
/// * `RenderError::MissingAxis` - 2D chart without y bins
/// * `RenderError::Bin` - 2D series are not index-aligned
pub fn generate_chart_svg(chart: &Chart, config: &SvgConfig) -> Result<String, RenderError> {
    if chart.series.is_empty() {
        return Err(RenderError::EmptyChart(chart.file_stem.clone()));
    }

    let frame = Frame::new(config);
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = config.width,
        h = config.height
    ));
    svg.push_str(r#"<style>text { font: 12px sans-serif; } .title { font-size: 16px; font-weight: bold; }</style>"#);
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="white"/>"#,
        config.width, config.height
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="25" text-anchor="middle" class="title">{}</text>"#,
        config.width / 2,
        escape_xml(&chart.title)
    ));

    if chart.is_2d() {
        render_heat_map(chart, &frame, &mut svg)?;
    } else {
        render_bars(chart, &frame, &mut svg);
        render_legend(chart, &frame, &mut svg);
    }

    render_axes(chart, &frame, &mut svg);
    svg.push_str("</svg>");

    debug!("Generated {} ({} bytes)", chart.file_stem, svg.len());
    Ok(svg)
}

/// Plot area inside the margins
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn new(config: &SvgConfig) -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: (config.width as f64 - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (config.height as f64 - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Horizontal pixel position of a value on the x bins
    fn x_of(&self, bins: &BinSpec, value: f64) -> f64 {
        self.left + self.width * axis_fraction(bins, value)
    }
}

/// Position of `value` between the first and last edge, in `[0, 1]`
fn axis_fraction(bins: &BinSpec, value: f64) -> f64 {
    let (lo, hi, v) = if bins.is_log() {
        (bins.first().log10(), bins.last().log10(), value.log10())
    } else {
        (bins.first(), bins.last(), value)
    };
    ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
}

fn render_bars(chart: &Chart, frame: &Frame, out: &mut String) {
    let bins = &chart.x_bins;
    let values: Vec<Vec<f64>> = chart
        .histograms()
        .iter()
        .map(|hist| {
            if chart.density {
                hist.density(bins)
            } else {
                hist.counts.iter().map(|&c| c as f64).collect()
            }
        })
        .collect();

    let max = values
        .iter()
        .flat_map(|v| v.iter().copied())
        .fold(0.0f64, f64::max);
    if max <= 0.0 {
        return;
    }

    let groups = values.len() as f64;
    for (idx, series_values) in values.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        for (bin, &value) in series_values.iter().enumerate() {
            if value <= 0.0 {
                continue;
            }
            let x0 = frame.x_of(bins, bins.edges()[bin]);
            let x1 = frame.x_of(bins, bins.edges()[bin + 1]);
            let bar_w = (x1 - x0) / groups;
            let bar_h = frame.height * value / max;

            out.push_str(&format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"><title>{} [{}, {}): {}</title></rect>"#,
                x0 + bar_w * idx as f64,
                frame.bottom() - bar_h,
                bar_w,
                bar_h,
                color,
                escape_xml(&chart.series[idx].label),
                format_edge(bins.edges()[bin]),
                format_edge(bins.edges()[bin + 1]),
                value
            ));
        }
    }
}

fn render_heat_map(chart: &Chart, frame: &Frame, out: &mut String) -> Result<(), RenderError> {
    let y_bins = chart
        .y_bins
        .as_ref()
        .ok_or_else(|| RenderError::MissingAxis(chart.file_stem.clone()))?;
    let hist = chart
        .histogram_2d()
        .ok_or_else(|| RenderError::EmptyChart(chart.file_stem.clone()))??;

    let max = hist.max_count();
    if max == 0 {
        return Ok(());
    }

    let cell_w = frame.width / chart.x_bins.bin_count() as f64;
    let cell_h = frame.height / y_bins.bin_count() as f64;

    for (xi, column) in hist.counts.iter().enumerate() {
        for (yi, &count) in column.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let intensity = count as f64 / max as f64;
            out.push_str(&format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"><title>{} ops</title></rect>"#,
                frame.left + xi as f64 * cell_w,
                frame.bottom() - (yi + 1) as f64 * cell_h,
                cell_w,
                cell_h,
                heat_color(intensity),
                count
            ));
        }
    }

    // y ticks, thinned like the x axis
    let labels = y_bins.labels();
    let stride = tick_stride(labels.len());
    for (yi, label) in labels.iter().enumerate().step_by(stride) {
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end" dy="4">{}</text>"#,
            frame.left - 6.0,
            frame.bottom() - (yi + 1) as f64 * cell_h,
            label
        ));
    }

    Ok(())
}

fn render_axes(chart: &Chart, frame: &Frame, out: &mut String) {
    out.push_str(&format!(
        r#"<line x1="{l:.2}" y1="{b:.2}" x2="{r:.2}" y2="{b:.2}" stroke="black"/><line x1="{l:.2}" y1="{t:.2}" x2="{l:.2}" y2="{b:.2}" stroke="black"/>"#,
        l = frame.left,
        r = frame.left + frame.width,
        t = frame.top,
        b = frame.bottom()
    ));

    // x tick label sits at the upper edge of its bin
    // labels beyond the last bin have no edge to sit on
    let ticks = chart.x_tick_labels.len().min(chart.x_bins.bin_count());
    let stride = tick_stride(ticks);
    for (bin, label) in chart.x_tick_labels[..ticks].iter().enumerate().step_by(stride) {
        let x = if chart.is_2d() {
            frame.left + frame.width * (bin + 1) as f64 / chart.x_bins.bin_count() as f64
        } else {
            frame.x_of(&chart.x_bins, chart.x_bins.edges()[bin + 1])
        };
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            x,
            frame.bottom() + 18.0,
            label
        ));
    }

    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
        frame.left + frame.width / 2.0,
        frame.bottom() + 45.0,
        escape_xml(&chart.x_label)
    ));
    out.push_str(&format!(
        r#"<text x="20" y="{y:.2}" text-anchor="middle" transform="rotate(-90 20 {y:.2})">{}</text>"#,
        escape_xml(&chart.y_label),
        y = frame.top + frame.height / 2.0
    ));
}

fn render_legend(chart: &Chart, frame: &Frame, out: &mut String) {
    let right = frame.left + frame.width;
    for (idx, series) in chart.series.iter().enumerate() {
        let y = frame.top + 10.0 + idx as f64 * 20.0;
        out.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="15" height="15" fill="{}" rx="2"/>"#,
            right - 140.0,
            y - 12.0,
            PALETTE[idx % PALETTE.len()]
        ));
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}">{}</text>"#,
            right - 120.0,
            y,
            escape_xml(&series.label)
        ));
    }
}

fn tick_stride(labels: usize) -> usize {
    labels.div_ceil(MAX_TICKS).max(1)
}

/// White to deep blue
fn heat_color(intensity: f64) -> String {
    let t = intensity.clamp(0.0, 1.0);
    let channel = |from: f64, to: f64| (from + (to - from) * t).round() as u8;
    format!(
        "rgb({}, {}, {})",
        channel(235.0, 8.0),
        channel(245.0, 48.0),
        channel(255.0, 107.0)
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::TraceResult;
    use crate::chart::model::{combined, latency_vs_size};
    use crate::parser::OpType;
    use crate::utils::config::BinningConfig;

    fn trace() -> TraceResult {
        TraceResult {
            name: "run_tlsf.csv".to_string(),
            malloc_latency: vec![500, 2500, 700],
            malloc_size: vec![1.0, 2.0, 0.5],
            free_latency: vec![900, 300],
            free_size: vec![1.0, 0.5],
            malloc_spikes: 1,
            free_spikes: 1,
        }
    }

    #[test]
    fn test_combined_svg() {
        let chart = combined(&trace(), &BinningConfig::default()).unwrap();
        let svg = generate_chart_svg(&chart, &SvgConfig::default()).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("cpu cycles for total ops: 5"));
        assert!(svg.contains(&format!("{}+", format_edge(chart.x_bins.last()))));
        assert!(svg.contains(">malloc<"));
        assert!(svg.contains(">free<"));
    }

    #[test]
    fn test_heat_map_svg() {
        let chart = latency_vs_size(&trace(), OpType::Malloc, &BinningConfig::default()).unwrap();
        let svg = generate_chart_svg(&chart, &SvgConfig::default()).unwrap();

        assert!(svg.contains("Block size (MB)"));
        assert!(svg.contains("ops</title>"));
    }

    #[test]
    fn test_empty_chart_rejected() {
        let mut chart = combined(&trace(), &BinningConfig::default()).unwrap();
        chart.series.clear();
        assert!(matches!(
            generate_chart_svg(&chart, &SvgConfig::default()),
            Err(RenderError::EmptyChart(_))
        ));
    }

    #[test]
    fn test_hand_built_tick_labels_need_not_match_bins() {
        let mut chart = combined(&trace(), &BinningConfig::default()).unwrap();

        chart.x_tick_labels.truncate(1);
        let svg = generate_chart_svg(&chart, &SvgConfig::default()).unwrap();
        assert!(svg.contains("<rect"));

        chart.x_tick_labels = vec!["x".to_string(); chart.x_bins.bin_count() + 5];
        assert!(generate_chart_svg(&chart, &SvgConfig::default()).is_ok());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn test_tick_stride() {
        assert_eq!(tick_stride(0), 1);
        assert_eq!(tick_stride(20), 1);
        assert_eq!(tick_stride(40), 2);
    }

    #[test]
    fn test_renderer_writes_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut renderer = SvgRenderer::new(temp_dir.path().join("plots"));
        let chart = combined(&trace(), &BinningConfig::default()).unwrap();

        let path = renderer.render(&chart).unwrap();
        assert_eq!(path, temp_dir.path().join("plots/run_tlsf.csv.svg"));
        assert!(path.exists());
    }
}
