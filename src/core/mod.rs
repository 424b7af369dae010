//! Pipeline stages and the orchestrator that chains them.

pub mod pipeline;
pub mod services;

pub use pipeline::{Pipeline, PipelineOutput};
