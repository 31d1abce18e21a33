//! Adaptive histogram binning.
//!
//! This module computes:
//! - Mean-scaled bin edges for a single series
//! - Shared bin edges for N series compared on one chart
//! - Log-spaced edges derived from a linear pass
//! - Clipped 1D and 2D bucket counts over those edges

pub mod histogram;
pub mod spec;

// Re-export main types and functions
pub use histogram::{Histogram, Histogram2d};
pub use spec::{format_edge, mean, roundup, BinSpec, Sample};
