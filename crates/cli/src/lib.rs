//! `ordermart-cli`: wires configured sources and the warehouse into one ETL run.
//!
//! The binary in `main.rs` only parses arguments, loads config, and maps a
//! [`pipeline::PipelineReport`] onto an exit code.

pub mod exit_codes;
pub mod pipeline;

pub use pipeline::{run_pipeline, Diagnostic, Level, Outcome, PipelineReport, Stage};
