//! Classification of trace events and aggregate statistics.
//!
//! This module transforms parsed events into:
//! - Per-op-type latency and size series
//! - Spike counts against configured cutoffs
//! - Spike percentages per trace

pub mod classifier;
pub mod report;

// Re-export main types and functions
pub use classifier::{classify, count_spikes, is_spike, TraceResult};
pub use report::{spike_percentage, AggregateReport};
