//! Bucket series into precomputed bins.
//!
//! Samples are clipped into the spec's range first, so outliers land in the
//! terminal bin instead of being dropped.

use super::spec::{BinSpec, Sample};
use crate::utils::error::BinError;
use serde::Serialize;

/// Counts of one series over one `BinSpec`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub counts: Vec<u64>,
    pub total: u64,
}

impl Histogram {
    pub fn from_series<T: Sample>(series: &[T], bins: &BinSpec) -> Self {
        let mut counts = vec![0u64; bins.bin_count()];
        for sample in series {
            counts[bins.bin_index(sample.value())] += 1;
        }

        Self {
            counts,
            total: series.len() as u64,
        }
    }

    /// Normalized so the histogram integrates to 1 over the bins
    ///
    /// An empty series yields all zeros.
    pub fn density(&self, bins: &BinSpec) -> Vec<f64> {
        if self.total == 0 {
            return vec![0.0; self.counts.len()];
        }

        self.counts
            .iter()
            .enumerate()
            .map(|(bin, &count)| count as f64 / (self.total as f64 * bins.width(bin)))
            .collect()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Joint counts of two index-aligned series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram2d {
    /// `counts[x][y]`
    pub counts: Vec<Vec<u64>>,
    pub total: u64,
}

impl Histogram2d {
    /// Each axis is clipped with its own spec
    ///
    /// # Errors
    /// * `BinError::LengthMismatch` - The series are not index-aligned
    pub fn from_series<X: Sample, Y: Sample>(
        x: &[X],
        y: &[Y],
        x_bins: &BinSpec,
        y_bins: &BinSpec,
    ) -> Result<Self, BinError> {
        if x.len() != y.len() {
            return Err(BinError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }

        let mut counts = vec![vec![0u64; y_bins.bin_count()]; x_bins.bin_count()];
        for (xs, ys) in x.iter().zip(y) {
            counts[x_bins.bin_index(xs.value())][y_bins.bin_index(ys.value())] += 1;
        }

        Ok(Self {
            counts,
            total: x.len() as u64,
        })
    }

    pub fn max_count(&self) -> u64 {
        self.counts
            .iter()
            .flat_map(|column| column.iter().copied())
            .max()
            .unwrap_or(0)
    }
}
