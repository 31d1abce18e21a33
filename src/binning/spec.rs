//! Bin edge construction.
//!
//! Two linear policies anchor the range on series means rather than maxima,
//! so a handful of huge outliers cannot squash every ordinary sample into the
//! first bin. Outliers are clipped into the terminal bin instead.
//!
//! - `mean_scaled`: one series, range `mean * 3`, used per axis of the
//!   latency-vs-size chart.
//! - `shared_range`: N series, range `max(mean * 2)` rounded up to a base.
//!   Every series gets the same edges so density histograms overlay.
//!
//! Both stop short of the range: the edges are `0, step, 2 * step, ...`
//! below the upper bound, and the last of them is the clip boundary.
//!
//! `logarithmic` turns a linear spec into geometric edges with the same
//! endpoints and edge count.

use crate::utils::config::{HIST2D_MEAN_FACTOR, OVERFLOW_MARKER, SHARED_MEAN_FACTOR};
use crate::utils::error::BinError;
use serde::{Deserialize, Serialize};

/// Numeric sample that can be binned
pub trait Sample: Copy {
    fn value(self) -> f64;
}

impl Sample for u64 {
    fn value(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    fn value(self) -> f64 {
        self
    }
}

/// Arithmetic mean, `None` for an empty series
pub fn mean<T: Sample>(series: &[T]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let sum: f64 = series.iter().map(|s| s.value()).sum();
    Some(sum / series.len() as f64)
}

/// Round `value` up to a multiple of `base` (`ceil(value / base) * base`)
///
/// Exact multiples are returned unchanged.
pub fn roundup(value: f64, base: f64) -> f64 {
    (value / base).ceil() * base
}

/// Bin edges for one chart axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    edges: Vec<f64>,
    /// Linear width, or log10 width for log specs
    step: f64,
    is_log: bool,
}

impl BinSpec {
    /// `divisions` edges of width `mean * 3 / divisions`, starting at 0
    ///
    /// `mean * 3` itself is not an edge. The last edge, one step below it,
    /// is the clip boundary, so there are `divisions - 1` bins.
    ///
    /// # Errors
    /// * `BinError::InvalidRange` - Empty series, fewer than two divisions,
    ///   or a mean that is not positive
    pub fn mean_scaled<T: Sample>(series: &[T], divisions: usize) -> Result<Self, BinError> {
        check_divisions(divisions)?;
        let mean = mean(series)
            .ok_or_else(|| invalid("cannot scale bins to an empty series".to_string()))?;

        let upper = mean * HIST2D_MEAN_FACTOR;
        check_upper(upper)?;

        let step = upper / divisions as f64;
        let edges = (0..divisions).map(|i| i as f64 * step).collect();

        Self::from_edges(edges, step, false)
    }

    /// One set of edges shared by every series in `series_set`
    ///
    /// The range is the largest `mean * 2`, rounded up to `base`. The step is
    /// `range / divisions` rounded up to `base`. Edges are the multiples of
    /// the step strictly below the range. The result only depends on the set
    /// of series, not on their order.
    ///
    /// # Errors
    /// * `BinError::InvalidRange` - No series, an empty series, a
    ///   non-positive base, all means zero, or a range holding a single step
    pub fn shared_range<T: Sample>(
        series_set: &[&[T]],
        divisions: usize,
        base: f64,
    ) -> Result<Self, BinError> {
        check_divisions(divisions)?;
        if !(base.is_finite() && base > 0.0) {
            return Err(invalid(format!("rounding base {} is not positive", base)));
        }
        if series_set.is_empty() {
            return Err(invalid("no series to share a range across".to_string()));
        }

        let mut upper = 0.0f64;
        for (idx, series) in series_set.iter().enumerate() {
            let mean = mean(series)
                .ok_or_else(|| invalid(format!("series {} is empty", idx)))?;
            upper = upper.max(mean * SHARED_MEAN_FACTOR);
        }

        let range = roundup(upper, base);
        check_upper(range)?;

        let step = roundup(range / divisions as f64, base);
        let count = (range / step).ceil() as usize;
        let edges = (0..count).map(|i| i as f64 * step).collect();

        Self::from_edges(edges, step, false)
    }

    /// `bin_count` equal bins between the smallest and largest sample
    ///
    /// This is the initial linear pass ahead of `logarithmic`. With several
    /// series the span covers all of them. A single repeated value is widened
    /// by half a unit on each side.
    ///
    /// # Errors
    /// * `BinError::InvalidRange` - No samples, a non-finite sample, or a
    ///   span too narrow for its magnitude to yield distinct edges
    pub fn data_span<T: Sample>(series_set: &[&[T]], bin_count: usize) -> Result<Self, BinError> {
        if bin_count == 0 {
            return Err(invalid("bin count must be greater than 0".to_string()));
        }

        let mut values = series_set.iter().flat_map(|s| s.iter().map(|v| v.value()));
        let first = values
            .next()
            .ok_or_else(|| invalid("cannot span bins over empty series".to_string()))?;
        let (mut lo, mut hi) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

        if !(lo.is_finite() && hi.is_finite()) {
            return Err(invalid(format!("non-finite sample span [{}, {}]", lo, hi)));
        }
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let step = (hi - lo) / bin_count as f64;
        let mut edges: Vec<f64> = (0..bin_count).map(|i| lo + i as f64 * step).collect();
        edges.push(hi);

        Self::from_edges(edges, step, false)
    }

    /// Geometric edges between the first and last edge of `linear`
    ///
    /// # Errors
    /// * `BinError::InvalidRange` - The first edge is not strictly positive,
    ///   or neighbouring geometric edges round to the same value
    pub fn logarithmic(linear: &BinSpec) -> Result<Self, BinError> {
        let first = linear.first();
        let last = linear.last();
        if !(first > 0.0) {
            return Err(invalid(format!(
                "log bins need a strictly positive first edge, got {}",
                first
            )));
        }

        let lo = first.log10();
        let hi = last.log10();
        let intervals = linear.edges.len() - 1;
        let step = (hi - lo) / intervals as f64;

        let mut edges: Vec<f64> = (0..intervals)
            .map(|i| 10f64.powf(lo + i as f64 * step))
            .collect();
        edges[0] = first;
        edges.push(last);

        Self::from_edges(edges, step, true)
    }

    /// `logarithmic(data_span(..))`
    pub fn log_span<T: Sample>(series_set: &[&[T]], bin_count: usize) -> Result<Self, BinError> {
        Self::logarithmic(&Self::data_span(series_set, bin_count)?)
    }

    /// Every constructor ends here: at least two strictly increasing edges
    fn from_edges(edges: Vec<f64>, step: f64, is_log: bool) -> Result<Self, BinError> {
        if edges.len() < 2 {
            return Err(invalid(format!(
                "{} edge(s) with step {} do not make a bin",
                edges.len(),
                step
            )));
        }
        if let Some(pair) = edges.windows(2).find(|pair| !(pair[0] < pair[1])) {
            return Err(invalid(format!(
                "edges are not strictly increasing ({} then {})",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            edges,
            step,
            is_log,
        })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_log(&self) -> bool {
        self.is_log
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn first(&self) -> f64 {
        self.edges[0]
    }

    /// Upper clip boundary
    pub fn last(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    pub fn width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }

    /// Clamp a sample into `[first, last]`
    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.first(), self.last())
    }

    /// Bin of a sample after clipping. Bins are half-open except the last.
    pub fn bin_index(&self, value: f64) -> usize {
        let clipped = self.clip(value);
        let idx = self.edges.partition_point(|&edge| edge <= clipped);
        idx.saturating_sub(1).min(self.bin_count() - 1)
    }

    /// One label per bin (its upper edge); the last one is overflow-marked
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.edges[1..].iter().map(|&e| format_edge(e)).collect();
        if let Some(last) = labels.last_mut() {
            last.push_str(OVERFLOW_MARKER);
        }
        labels
    }
}

/// Whole numbers without decimals, everything else with two
pub fn format_edge(edge: f64) -> String {
    if edge.fract() == 0.0 && edge.abs() < 1e15 {
        format!("{}", edge as i64)
    } else {
        format!("{:.2}", edge)
    }
}

fn check_divisions(divisions: usize) -> Result<(), BinError> {
    if divisions < 2 {
        return Err(invalid(format!(
            "{} division(s) leave no bin below the range",
            divisions
        )));
    }
    Ok(())
}

fn check_upper(upper: f64) -> Result<(), BinError> {
    if upper.is_finite() && upper > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("upper bound {} is not positive", upper)))
    }
}

fn invalid(reason: String) -> BinError {
    BinError::InvalidRange(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean::<u64>(&[]), None);
        assert_eq!(mean(&[1u64, 2, 3]), Some(2.0));
        assert_eq!(mean(&[0.5f64, 1.5]), Some(1.0));
    }

    #[test]
    fn test_mean_scaled_edges() {
        // mean 100 -> upper 300, step 100; 300 itself is not an edge
        let spec = BinSpec::mean_scaled(&[50u64, 150], 3).unwrap();
        assert_eq!(spec.edges(), &[0.0, 100.0, 200.0]);
        assert_eq!(spec.step(), 100.0);
        assert!(!spec.is_log());
        assert_eq!(spec.bin_count(), 2);
    }

    #[test]
    fn test_mean_scaled_stops_one_step_short() {
        // mean 100 -> upper 300, step 7.5 -> last edge 292.5
        let spec = BinSpec::mean_scaled(&[100u64], 40).unwrap();
        assert_eq!(spec.edges().len(), 40);
        assert_eq!(spec.step(), 7.5);
        assert_eq!(spec.first(), 0.0);
        assert_eq!(spec.last(), 292.5);
        assert!(spec.edges().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_mean_scaled_rejects_zero_mean() {
        assert!(BinSpec::mean_scaled(&[0u64, 0], 10).is_err());
        assert!(BinSpec::mean_scaled::<u64>(&[], 10).is_err());
        assert!(BinSpec::mean_scaled(&[10u64], 0).is_err());
        assert!(BinSpec::mean_scaled(&[10u64], 1).is_err());
    }

    #[test]
    fn test_shared_range_rounds_range_and_step() {
        // means 500 and 1000 -> uppers 1000, 2000 -> range 2000, step 100
        let a = [400u64, 600];
        let b = [1000u64];
        let spec = BinSpec::shared_range(&[&a[..], &b[..]], 20, 100.0).unwrap();

        assert_eq!(spec.step(), 100.0);
        assert_eq!(spec.edges().len(), 20);
        assert_eq!(spec.first(), 0.0);
        assert_eq!(spec.last(), 1900.0);
        assert_eq!(spec.bin_count(), 19);
        assert_eq!(spec.labels().last().unwrap(), "1900+");
    }

    #[test]
    fn test_shared_range_clips_above_last_edge() {
        let a = [400u64, 600];
        let b = [1000u64];
        let spec = BinSpec::shared_range(&[&a[..], &b[..]], 20, 100.0).unwrap();

        // 1950 is past the clip boundary and shares the overflow bin
        assert_eq!(spec.clip(1950.0), 1900.0);
        assert_eq!(spec.bin_index(1950.0), spec.bin_index(1850.0));
        assert_eq!(spec.bin_index(1950.0), 18);
    }

    #[test]
    fn test_shared_range_step_not_dividing_range() {
        // mean 1050 -> 2100; step ceil(105 / 100) * 100 = 200 -> last edge 2000
        let a = [1050u64];
        let spec = BinSpec::shared_range(&[&a[..]], 20, 100.0).unwrap();
        assert_eq!(spec.step(), 200.0);
        assert_eq!(spec.last(), 2000.0);
        assert_eq!(spec.bin_count(), 10);
    }

    #[test]
    fn test_shared_range_single_step_is_invalid() {
        // mean 10 -> 20 -> range 100, step 100: only the 0 edge
        let a = [10u64];
        assert!(matches!(
            BinSpec::shared_range(&[&a[..]], 20, 100.0),
            Err(BinError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_shared_range_errors() {
        let empty: [u64; 0] = [];
        let zeros = [0u64, 0];
        assert!(BinSpec::shared_range::<u64>(&[], 20, 100.0).is_err());
        assert!(BinSpec::shared_range(&[&empty[..]], 20, 100.0).is_err());
        assert!(BinSpec::shared_range(&[&zeros[..]], 20, 100.0).is_err());
        assert!(BinSpec::shared_range(&[&[5u64][..]], 20, 0.0).is_err());
    }

    #[test]
    fn test_data_span() {
        let a = [10u64, 20];
        let b = [50u64];
        let spec = BinSpec::data_span(&[&a[..], &b[..]], 4).unwrap();
        assert_eq!(spec.edges(), &[10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_data_span_single_value() {
        let spec = BinSpec::data_span(&[&[7u64][..]], 2).unwrap();
        assert_eq!(spec.edges(), &[6.5, 7.0, 7.5]);
    }

    #[test]
    fn test_narrow_span_at_large_magnitude_is_invalid() {
        // 2^53 apart by 2: a 40-way split is below f64 resolution
        let series = [1u64 << 53, (1u64 << 53) + 2];
        assert!(matches!(
            BinSpec::data_span(&[&series[..]], 40),
            Err(BinError::InvalidRange(_))
        ));
        assert!(matches!(
            BinSpec::log_span(&[&series[..]], 40),
            Err(BinError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_logarithmic() {
        let linear = BinSpec::data_span(&[&[1u64, 1000][..]], 3).unwrap();
        let log = BinSpec::logarithmic(&linear).unwrap();

        assert!(log.is_log());
        assert_eq!(log.edges().len(), linear.edges().len());
        assert_eq!(log.first(), 1.0);
        assert_eq!(log.last(), 1000.0);
        assert!((log.edges()[1] - 10.0).abs() < 1e-9);
        assert!((log.edges()[2] - 100.0).abs() < 1e-9);
        assert!((log.step() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_logarithmic_rejects_zero_first_edge() {
        let linear = BinSpec::mean_scaled(&[10u64], 4).unwrap();
        assert_eq!(linear.first(), 0.0);
        assert!(matches!(
            BinSpec::logarithmic(&linear),
            Err(BinError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_bin_index_and_clip() {
        // edges 0, 100, 200
        let spec = BinSpec::mean_scaled(&[50u64, 150], 3).unwrap();
        assert_eq!(spec.bin_index(0.0), 0);
        assert_eq!(spec.bin_index(99.9), 0);
        assert_eq!(spec.bin_index(100.0), 1);
        assert_eq!(spec.bin_index(200.0), 1);
        assert_eq!(spec.bin_index(1e9), 1);
        assert_eq!(spec.clip(1e9), 200.0);
        assert_eq!(spec.clip(-5.0), 0.0);
    }

    #[test]
    fn test_labels_mark_overflow() {
        let spec = BinSpec::mean_scaled(&[50u64, 150], 4).unwrap();
        assert_eq!(spec.labels(), vec!["75", "150", "225+"]);
    }

    #[test]
    fn test_format_edge() {
        assert_eq!(format_edge(300.0), "300");
        assert_eq!(format_edge(0.126), "0.13");
        assert_eq!(format_edge(292.5), "292.50");
    }
}
