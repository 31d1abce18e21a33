//! Split a trace into malloc/free series and count spikes.
//!
//! Each op type gets two index-aligned series: latency in cycles and
//! chunk size in MiB. Sample `i` of both series describes the same event.

use crate::parser::{Event, OpType};
use crate::utils::config::{Cutoffs, BYTES_PER_MIB};
use log::debug;
use serde::Serialize;

/// Classified series for one trace file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceResult {
    /// Display name (file name without directories)
    pub name: String,

    pub malloc_latency: Vec<u64>,
    pub malloc_size: Vec<f64>,
    pub free_latency: Vec<u64>,
    pub free_size: Vec<f64>,

    pub malloc_spikes: usize,
    pub free_spikes: usize,
}

impl TraceResult {
    pub fn latency(&self, op: OpType) -> &[u64] {
        match op {
            OpType::Malloc => &self.malloc_latency,
            OpType::Free => &self.free_latency,
        }
    }

    pub fn size(&self, op: OpType) -> &[f64] {
        match op {
            OpType::Malloc => &self.malloc_size,
            OpType::Free => &self.free_size,
        }
    }

    pub fn spikes(&self, op: OpType) -> usize {
        match op {
            OpType::Malloc => self.malloc_spikes,
            OpType::Free => self.free_spikes,
        }
    }

    pub fn total_ops(&self) -> usize {
        self.malloc_latency.len() + self.free_latency.len()
    }
}

/// Classify events against the given cutoffs
///
/// **Public** - main entry point for classification
///
/// # Arguments
/// * `events` - Parsed events in file order
/// * `cutoffs` - Spike thresholds per op type
/// * `name` - Display name carried into the result
pub fn classify(events: &[Event], cutoffs: &Cutoffs, name: impl Into<String>) -> TraceResult {
    let mut result = TraceResult {
        name: name.into(),
        ..Default::default()
    };

    for event in events {
        let size_mib = event.size_bytes as f64 / BYTES_PER_MIB;

        match event.op_type {
            OpType::Malloc => {
                result.malloc_latency.push(event.latency_cycles);
                result.malloc_size.push(size_mib);
                if is_spike(event.latency_cycles, cutoffs.malloc_cutoff_cycles) {
                    result.malloc_spikes += 1;
                }
            }
            OpType::Free => {
                result.free_latency.push(event.latency_cycles);
                result.free_size.push(size_mib);
                if is_spike(event.latency_cycles, cutoffs.free_cutoff_cycles) {
                    result.free_spikes += 1;
                }
            }
        }
    }

    debug!(
        "{}: {} malloc ({} spikes), {} free ({} spikes)",
        result.name,
        result.malloc_latency.len(),
        result.malloc_spikes,
        result.free_latency.len(),
        result.free_spikes
    );

    result
}

/// Strictly above the cutoff
pub fn is_spike(latency_cycles: u64, cutoff_cycles: f64) -> bool {
    latency_cycles as f64 > cutoff_cycles
}

/// Count spikes in a latency series
pub fn count_spikes(latency: &[u64], cutoff_cycles: f64) -> usize {
    latency
        .iter()
        .filter(|&&cycles| is_spike(cycles, cutoff_cycles))
        .count()
}
