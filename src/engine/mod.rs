//! Core engine: the staged run and the pieces it assembles.

pub mod kickoff;
pub mod picks;
pub mod pipeline;
pub mod run;

pub use pipeline::{Pipeline, PipelineSettings, RunReport};
pub use run::{run_all, HttpSources, SourceFactory};
