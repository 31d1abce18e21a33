//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::run::RunToken;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a trace file
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Trace {} is truncated: expected a 2-line preamble, found {lines} line(s)", .path.display())]
    Truncated { path: PathBuf, lines: usize },

    #[error("Malformed row in {} at line {line} ({reason}): {row:?}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        row: String,
        reason: String,
    },
}

/// Traces claimed to come from the same benchmark run carry different run tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Trace run tokens mismatch ({}); if the traces come from different runs, disable the same-run check", describe_tokens(.tokens))]
pub struct RunMismatchError {
    /// Every compared trace as (label, token)
    pub tokens: Vec<(String, RunToken)>,
}

fn describe_tokens(tokens: &[(String, RunToken)]) -> String {
    tokens
        .iter()
        .map(|(label, token)| format!("{}={}", label, token))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while computing bin edges
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BinError {
    #[error("Invalid bin range: {0}")]
    InvalidRange(String),

    #[error("Series are not index-aligned: {x} x-samples vs {y} y-samples")]
    LengthMismatch { x: usize, y: usize },
}

/// Errors that can occur while computing aggregate statistics
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Percentage of {what} is undefined: no events")]
    DivisionUndefined { what: String },
}

/// Errors that can occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while rendering a chart
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart {0} has no series to draw")]
    EmptyChart(String),

    #[error("Chart {0} is two-dimensional but has no y-axis bins")]
    MissingAxis(String),

    #[error(transparent)]
    Bin(#[from] BinError),

    #[error(transparent)]
    Output(#[from] OutputError),
}
