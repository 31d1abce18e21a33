//! Trace parsing.
//!
//! This module handles:
//! - Reading benchmark CSV traces
//! - Skipping the plan-size/header preamble
//! - Turning rows into typed `Event`s

pub mod event;
pub mod trace_reader;

// Re-export main types
pub use event::{Event, OpType};
pub use trace_reader::{parse_trace_reader, parse_trace_str, read_trace};
