//! Alloc Trace Studio
//!
//! Latency analysis of memory-allocator traces: classifies malloc/free
//! events, counts latency spikes, bins latencies adaptively and draws
//! histograms comparing allocators from the same benchmark run.
//!
//! This crate provides the core implementation for the
//! `alloc-trace` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! alloc-trace analyze traces/20180808T021350Z_tlsf_mem_trace_out.csv
//! alloc-trace compare --tlsf a.csv --native b.csv --same-run true
//! ```

pub mod aggregator;
pub mod binning;
pub mod chart;
pub mod commands;
pub mod output;
pub mod parser;
pub mod run;
pub mod utils;
