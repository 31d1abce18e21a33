//! Configuration and constants for the analysis.
//!
//! `AnalysisConfig` is built once per invocation (defaults, optional TOML file,
//! CLI overrides) and passed by reference to every stage that needs it.

use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current stats document schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Lines at the top of every trace (plan size, column headers)
pub const PREAMBLE_LINES: usize = 2;

/// Minimum number of comma-separated fields in a trace row
pub const TRACE_FIELDS: usize = 4;

pub const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Op type literal for allocations; every other op type counts as a free
pub const MALLOC_OP: &str = "malloc";

pub const DEFAULT_MALLOC_CUTOFF: f64 = 2000.0;
pub const DEFAULT_FREE_CUTOFF: f64 = 800.0;

pub const DEFAULT_HIST2D_BINS: usize = 40;
pub const DEFAULT_COMBINED_BINS: usize = 20;
pub const DEFAULT_LOG_BINS: usize = 40;
pub const DEFAULT_ROUNDING_BASE: f64 = 100.0;

// Upper bound multipliers applied to a series mean
pub const HIST2D_MEAN_FACTOR: f64 = 3.0;
pub const SHARED_MEAN_FACTOR: f64 = 2.0;

/// Marker appended to the terminal bin label
pub const OVERFLOW_MARKER: &str = "+";

/// Per-op-type spike thresholds, in cycles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cutoffs {
    pub malloc_cutoff_cycles: f64,
    pub free_cutoff_cycles: f64,
}

impl Default for Cutoffs {
    fn default() -> Self {
        Self {
            malloc_cutoff_cycles: DEFAULT_MALLOC_CUTOFF,
            free_cutoff_cycles: DEFAULT_FREE_CUTOFF,
        }
    }
}

impl Cutoffs {
    pub fn new(malloc_cutoff_cycles: f64, free_cutoff_cycles: f64) -> Result<Self, ConfigError> {
        let cutoffs = Self {
            malloc_cutoff_cycles,
            free_cutoff_cycles,
        };
        cutoffs.validate()?;
        Ok(cutoffs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("malloc_cutoff_cycles", self.malloc_cutoff_cycles)?;
        check_positive("free_cutoff_cycles", self.free_cutoff_cycles)
    }
}

/// Bin counts and rounding used by the adaptive binner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    /// Range divisions per axis for latency-vs-size charts. The range end
    /// is not an edge, so this yields one bin fewer.
    pub hist2d_bins: usize,

    /// Range divisions for the linear malloc/free chart of one trace
    pub combined_bins: usize,

    /// Bins for log-scale allocator comparisons
    pub log_bins: usize,

    /// Shared ranges and steps are rounded up to a multiple of this
    pub rounding_base: f64,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            hist2d_bins: DEFAULT_HIST2D_BINS,
            combined_bins: DEFAULT_COMBINED_BINS,
            log_bins: DEFAULT_LOG_BINS,
            rounding_base: DEFAULT_ROUNDING_BASE,
        }
    }
}

impl BinningConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, bins, min) in [
            ("hist2d_bins", self.hist2d_bins, 2),
            ("combined_bins", self.combined_bins, 2),
            ("log_bins", self.log_bins, 1),
        ] {
            if bins < min {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at least {}, got {}",
                    name, min, bins
                )));
            }
        }
        check_positive("rounding_base", self.rounding_base)
    }
}

/// Everything the analysis stages read during one run of the tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub cutoffs: Cutoffs,
    pub binning: BinningConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cutoffs.validate()?;
        self.binning.validate()
    }

    /// Replace cutoffs with whichever CLI values were given
    pub fn with_cutoff_overrides(mut self, malloc: Option<f64>, free: Option<f64>) -> Self {
        if let Some(malloc) = malloc {
            self.cutoffs.malloc_cutoff_cycles = malloc;
        }
        if let Some(free) = free {
            self.cutoffs.free_cutoff_cycles = free;
        }
        self
    }
}

/// Load an analysis config from a TOML file
///
/// Missing tables and keys fall back to their defaults.
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::Parse` - If TOML is invalid
/// * `ConfigError::Invalid` - If a value is out of range
///
/// # Example
/// ```ignore
/// let config = load_config("analysis.toml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AnalysisConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cutoffs.malloc_cutoff_cycles, 2000.0);
        assert_eq!(config.cutoffs.free_cutoff_cycles, 800.0);
        assert_eq!(config.binning.hist2d_bins, 40);
        assert_eq!(config.binning.combined_bins, 20);
        assert_eq!(config.binning.rounding_base, 100.0);
    }

    #[test]
    fn test_cutoffs_reject_non_positive() {
        assert!(Cutoffs::new(0.0, 800.0).is_err());
        assert!(Cutoffs::new(2000.0, -1.0).is_err());
        assert!(Cutoffs::new(f64::NAN, 800.0).is_err());
        assert!(Cutoffs::new(2000.0, 800.0).is_ok());
    }

    #[test]
    fn test_zero_bins_rejected() {
        let binning = BinningConfig {
            log_bins: 0,
            ..Default::default()
        };
        assert!(binning.validate().is_err());
    }

    #[test]
    fn test_single_linear_division_rejected() {
        let binning = BinningConfig {
            hist2d_bins: 1,
            ..Default::default()
        };
        assert!(binning.validate().is_err());

        let binning = BinningConfig {
            log_bins: 1,
            ..Default::default()
        };
        assert!(binning.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[cutoffs]\nfree_cutoff_cycles = 650.0\n\n[binning]\nlog_bins = 30").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.cutoffs.free_cutoff_cycles, 650.0);
        assert_eq!(config.cutoffs.malloc_cutoff_cycles, DEFAULT_MALLOC_CUTOFF);
        assert_eq!(config.binning.log_bins, 30);
        assert_eq!(config.binning.combined_bins, DEFAULT_COMBINED_BINS);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[binning]\nrounding_base = 0.0").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_cli_overrides() {
        let config = AnalysisConfig::default().with_cutoff_overrides(Some(1500.0), None);
        assert_eq!(config.cutoffs.malloc_cutoff_cycles, 1500.0);
        assert_eq!(config.cutoffs.free_cutoff_cycles, DEFAULT_FREE_CUTOFF);
    }
}
