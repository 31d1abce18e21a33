//! Aggregate spike statistics for a classified trace.
//!
//! Percentages over zero events are undefined, not zero. They are kept as
//! `None` (JSON `null`) and printed as `undefined`.

use super::classifier::TraceResult;
use crate::parser::OpType;
use crate::utils::config::Cutoffs;
use crate::utils::error::ReportError;
use log::warn;
use serde::{Deserialize, Serialize};

/// Summary statistics for one trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Trace display name
    pub name: String,

    /// Cutoffs the spikes were counted against
    pub malloc_cutoff_cycles: f64,
    pub free_cutoff_cycles: f64,

    pub total_ops: usize,
    pub malloc_ops: usize,
    pub free_ops: usize,

    pub total_spikes: usize,
    pub malloc_spikes: usize,
    pub free_spikes: usize,

    pub total_spike_percent: Option<f64>,
    pub malloc_spike_percent: Option<f64>,
    pub free_spike_percent: Option<f64>,
}

/// `100 * spikes / count`
///
/// # Errors
/// * `ReportError::DivisionUndefined` - `count` is zero
pub fn spike_percentage(spikes: usize, count: usize, what: &str) -> Result<f64, ReportError> {
    if count == 0 {
        return Err(ReportError::DivisionUndefined {
            what: what.to_string(),
        });
    }
    Ok(100.0 * spikes as f64 / count as f64)
}

impl AggregateReport {
    /// Build the report, logging every undefined percentage
    pub fn from_trace(trace: &TraceResult, cutoffs: &Cutoffs) -> Self {
        let malloc_ops = trace.latency(OpType::Malloc).len();
        let free_ops = trace.latency(OpType::Free).len();
        let total_ops = malloc_ops + free_ops;
        let total_spikes = trace.malloc_spikes + trace.free_spikes;

        let percent = |spikes: usize, count: usize, what: &str| {
            spike_percentage(spikes, count, what)
                .map_err(|err| warn!("{}: {}", trace.name, err))
                .ok()
        };

        Self {
            name: trace.name.clone(),
            malloc_cutoff_cycles: cutoffs.malloc_cutoff_cycles,
            free_cutoff_cycles: cutoffs.free_cutoff_cycles,
            total_ops,
            malloc_ops,
            free_ops,
            total_spikes,
            malloc_spikes: trace.malloc_spikes,
            free_spikes: trace.free_spikes,
            total_spike_percent: percent(total_spikes, total_ops, "all spikes"),
            malloc_spike_percent: percent(trace.malloc_spikes, malloc_ops, "malloc spikes"),
            free_spike_percent: percent(trace.free_spikes, free_ops, "free spikes"),
        }
    }

    /// Get human-readable summary
    ///
    /// **Public** - printed by the CLI after each trace
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(" ** Trace aggregate statistics\n");
        out.push_str(&format!(" -- Parsed filename: {}\n", self.name));
        out.push_str(&format!(
            " -- Cutoff threshold (in cycles): {} cycles for free and {} cycles for malloc\n",
            self.free_cutoff_cycles, self.malloc_cutoff_cycles
        ));
        out.push_str(&format!(
            "\t --- Total spikes: {} out of {} ops\n",
            self.total_spikes, self.total_ops
        ));
        out.push_str(&format!(
            "\t --- Total malloc spikes: {} out of {} ops\n",
            self.malloc_spikes, self.malloc_ops
        ));
        out.push_str(&format!(
            "\t --- Total free spikes: {} out of {} ops\n",
            self.free_spikes, self.free_ops
        ));
        out.push_str(&format!(
            "\t --- Total spike %: {}\n",
            format_percent(self.total_spike_percent)
        ));
        out.push_str(&format!(
            "\t --- Total malloc spike %: {}\n",
            format_percent(self.malloc_spike_percent)
        ));
        out.push_str(&format!(
            "\t --- Total free spike %: {}",
            format_percent(self.free_spike_percent)
        ));
        out
    }
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(percent) => format!("{} %", percent),
        None => "undefined".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_percentage() {
        assert_eq!(spike_percentage(1, 4, "x").unwrap(), 25.0);
        assert_eq!(spike_percentage(0, 4, "x").unwrap(), 0.0);
        assert_eq!(
            spike_percentage(0, 0, "free spikes"),
            Err(ReportError::DivisionUndefined {
                what: "free spikes".to_string()
            })
        );
    }

    #[test]
    fn test_summary_marks_undefined() {
        let trace = TraceResult {
            name: "malloc_only.csv".to_string(),
            malloc_latency: vec![10, 3000],
            malloc_size: vec![1.0, 1.0],
            malloc_spikes: 1,
            ..Default::default()
        };

        let report = AggregateReport::from_trace(&trace, &Cutoffs::default());
        let summary = report.summary();

        assert!(summary.contains("Total malloc spike %: 50 %"));
        assert!(summary.contains("Total free spike %: undefined"));
    }
}
