//! Run tokens and same-run verification.
//!
//! The benchmark names its traces `<run>_<allocator>_mem_trace_out.csv`,
//! where `<run>` is a timestamp such as `20180808T021350Z`. Traces written by
//! the same benchmark execution share that prefix.

use crate::utils::error::RunMismatchError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Opaque run correlation key. Only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunToken(String);

impl RunToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token of a trace path: file name, up to the first `_`
    ///
    /// A name without `_` is its own token.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        let token = file_name.split('_').next().unwrap_or_default();
        Self(token.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A trace path with the label it is compared under (e.g. `native`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTrace<'a> {
    pub label: &'a str,
    pub path: &'a Path,
}

impl<'a> LabeledTrace<'a> {
    pub fn new(label: &'a str, path: &'a Path) -> Self {
        Self { label, path }
    }
}

/// Check that traces come from the same benchmark run
///
/// **Public** - called before any trace of a comparison is parsed
///
/// With `same_run == false` nothing is checked. The first trace's token is
/// returned either way; it names the comparison outputs.
///
/// # Errors
/// * `RunMismatchError` - `same_run` is set and tokens differ
pub fn verify_same_run(
    traces: &[LabeledTrace<'_>],
    same_run: bool,
) -> Result<RunToken, RunMismatchError> {
    let tokens: Vec<(String, RunToken)> = traces
        .iter()
        .map(|trace| (trace.label.to_string(), RunToken::from_path(trace.path)))
        .collect();

    for (label, token) in &tokens {
        debug!("Trace run token for {} is: {}", label, token);
    }

    let Some((_, first)) = tokens.first() else {
        return Ok(RunToken::new(""));
    };
    let first = first.clone();

    if !same_run {
        info!("Same-run check disabled, comparing traces as given");
        return Ok(first);
    }

    if tokens.iter().any(|(_, token)| *token != first) {
        return Err(RunMismatchError { tokens });
    }

    Ok(first)
}
