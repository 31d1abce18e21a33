//! JSON output writer.
//!
//! Chart data and aggregate statistics are written as pretty JSON.

use super::{ensure_parent, validate_path};
use crate::aggregator::AggregateReport;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Statistics file written by `--report`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsDocument {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the document was generated
    pub generated_at: String,

    /// One report per parsed trace, in the order traces were given
    pub reports: Vec<AggregateReport>,
}

impl StatsDocument {
    pub fn new(reports: Vec<AggregateReport>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            reports,
        }
    }
}

/// Write any serializable value as pretty JSON
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_json<T: Serialize + ?Sized>(
    value: &T,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    debug!("Writing JSON to: {}", output_path.display());

    validate_path(output_path)?;
    ensure_parent(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value).map_err(OutputError::SerializationFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!(
        "JSON written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Write aggregate statistics for every parsed trace
pub fn write_stats(
    reports: &[AggregateReport],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_json(&StatsDocument::new(reports.to_vec()), output_path)
}

/// Read a statistics document back
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_stats(input_path: impl AsRef<Path>) -> Result<StatsDocument, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading stats from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let document: StatsDocument =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    Ok(document)
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_report() -> AggregateReport {
        AggregateReport {
            name: "20180808T021350Z_native_mem_trace_out.csv".to_string(),
            malloc_cutoff_cycles: 2000.0,
            free_cutoff_cycles: 800.0,
            total_ops: 8,
            malloc_ops: 4,
            free_ops: 4,
            total_spikes: 5,
            malloc_spikes: 3,
            free_spikes: 2,
            total_spike_percent: Some(62.5),
            malloc_spike_percent: Some(75.0),
            free_spike_percent: Some(50.0),
        }
    }

    #[test]
    fn test_write_and_read_stats() {
        let temp_file = NamedTempFile::new().unwrap();
        let report = create_test_report();

        write_stats(&[report.clone()], temp_file.path()).unwrap();
        let loaded = read_stats(temp_file.path()).unwrap();

        assert_eq!(loaded.version, SCHEMA_VERSION);
        assert_eq!(loaded.reports, vec![report]);
    }

    #[test]
    fn test_undefined_percent_is_null() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut report = create_test_report();
        report.free_ops = 0;
        report.free_spikes = 0;
        report.free_spike_percent = None;

        write_stats(&[report], temp_file.path()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(temp_file.path()).unwrap()).unwrap();

        assert!(value["reports"][0]["free_spike_percent"].is_null());
        assert_eq!(value["reports"][0]["malloc_spike_percent"], 75.0);
    }

    #[test]
    fn test_validate_output_path_empty() {
        assert!(write_json(&1, "").is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/stats.json");

        write_stats(&[create_test_report()], &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
