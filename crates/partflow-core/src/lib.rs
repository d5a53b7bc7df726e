//! Partflow Core: Part/Batch model, Processor trait and PipelineRunner
//!
//! A batch is an ordered, non-empty run of parts. Processors take a batch by
//! value and hand back a batch of the same length, optionally with a
//! `Response` that stops the pipeline.

pub mod context;
pub mod data_model;
pub mod error;
pub mod processor;
pub mod runner;

pub use context::ExecutionContext;
pub use data_model::{Batch, Part, ProcessorReport, Response};
pub use error::CoreError;
pub use processor::Processor;
pub use runner::{PipelineRunner, RunOutcome};

/// Engine version
pub const PARTFLOW_VERSION: &str = env!("CARGO_PKG_VERSION");
