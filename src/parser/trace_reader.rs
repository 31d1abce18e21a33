//! CSV trace reader for the allocator benchmark.
//!
//! Trace layout:
//! - line 1: plan size
//! - line 2: column headers (`op_type,chunk_size,block_id,exec_time`)
//! - lines 3..n: one event per row, e.g. `malloc,36757504,0,8580.000000`
//!
//! The preamble is skipped without inspection. The whole file is parsed
//! before anything downstream runs.

use super::event::Event;
use crate::utils::config::{MALLOC_OP, PREAMBLE_LINES};
use crate::utils::error::TraceError;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read and parse a trace file
///
/// **Public** - main entry point for parsing
///
/// # Errors
/// * `TraceError::Io` - File cannot be opened or read
/// * `TraceError::Truncated` - Fewer than two lines
/// * `TraceError::Malformed` - A row has fewer than 4 fields or bad numbers
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<Event>, TraceError> {
    let path = path.as_ref();
    debug!("Reading trace: {}", path.display());

    // Dropped on every return path, including parse failures
    let file = File::open(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_trace_reader(BufReader::new(file), path)
}

/// Parse trace text already held in memory
///
/// `source` is only used for error context.
pub fn parse_trace_str(contents: &str, source: impl AsRef<Path>) -> Result<Vec<Event>, TraceError> {
    parse_trace_reader(contents.as_bytes(), source.as_ref())
}

/// Parse a trace from any buffered reader
pub fn parse_trace_reader<R: BufRead>(reader: R, source: &Path) -> Result<Vec<Event>, TraceError> {
    let mut events = Vec::new();
    let mut preamble_seen = 0;
    let mut unknown_ops = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| TraceError::Io {
            path: source.to_path_buf(),
            source: err,
        })?;

        if idx < PREAMBLE_LINES {
            preamble_seen += 1;
            continue;
        }

        let row = line.trim();
        if row.is_empty() {
            continue;
        }

        let event = Event::from_row(row).map_err(|reason| TraceError::Malformed {
            path: source.to_path_buf(),
            line: idx + 1,
            row: row.to_string(),
            reason,
        })?;

        if !is_known_op(row) {
            unknown_ops += 1;
        }

        events.push(event);
    }

    if preamble_seen < PREAMBLE_LINES {
        return Err(TraceError::Truncated {
            path: source.to_path_buf(),
            lines: preamble_seen,
        });
    }

    if unknown_ops > 0 {
        debug!(
            "{}: {} row(s) with an op type other than malloc/free counted as free",
            source.display(),
            unknown_ops
        );
    }

    debug!("Parsed {} events from {}", events.len(), source.display());

    Ok(events)
}

fn is_known_op(row: &str) -> bool {
    let op = row.split(',').next().unwrap_or_default().trim();
    op == MALLOC_OP || op == "free"
}
