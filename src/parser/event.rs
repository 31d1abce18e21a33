//! Allocator benchmark events.
//!
//! One `Event` per CSV row: `op_type,chunk_size,block_id,exec_time`.

use crate::utils::config::{MALLOC_OP, TRACE_FIELDS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation recorded by the benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpType {
    Malloc,
    Free,
}

impl OpType {
    /// Total partition of op type strings.
    ///
    /// Only the exact literal `malloc` is an allocation. Anything else,
    /// including op types the benchmark never writes, is a free.
    pub fn classify(op: &str) -> Self {
        if op == MALLOC_OP {
            OpType::Malloc
        } else {
            OpType::Free
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpType::Malloc => "malloc",
            OpType::Free => "free",
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single malloc/free event from a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub op_type: OpType,
    pub size_bytes: u64,
    pub block_id: i64,
    /// Execution time, truncated toward zero to whole cycles
    pub latency_cycles: u64,
}

impl Event {
    /// Parse one trace row.
    ///
    /// Fields are trimmed; fields past the fourth are ignored.
    /// The error is a short reason, the caller adds file and line context.
    pub fn from_row(row: &str) -> Result<Self, String> {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() < TRACE_FIELDS {
            return Err(format!(
                "expected {} fields, found {}",
                TRACE_FIELDS,
                fields.len()
            ));
        }

        let size_bytes = fields[1]
            .parse::<u64>()
            .map_err(|_| format!("non-numeric chunk size {:?}", fields[1]))?;

        let block_id = fields[2]
            .parse::<i64>()
            .map_err(|_| format!("non-integer block id {:?}", fields[2]))?;

        Ok(Self {
            op_type: OpType::classify(fields[0]),
            size_bytes,
            block_id,
            latency_cycles: parse_cycles(fields[3])?,
        })
    }
}

/// Parse a decimal cycle count and drop the sub-cycle part
pub fn parse_cycles(field: &str) -> Result<u64, String> {
    let value = field
        .parse::<f64>()
        .map_err(|_| format!("non-numeric exec time {:?}", field))?;

    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < 0.0 {
        return Err(format!("exec time out of range {:?}", field));
    }

    Ok(truncated as u64)
}
