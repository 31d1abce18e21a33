//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the parser, aggregator and chart components.

pub mod analyze;
pub mod compare;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use analyze::execute_analyze;
pub use compare::execute_compare;
pub use models::{AnalyzeArgs, CompareArgs, OutputFormat, RunSummary};
pub use utils::{process_trace, renderer_for};
