//! Run identity matching for multi-trace comparisons.

pub mod token;

pub use token::{verify_same_run, LabeledTrace, RunToken};
