//! Integration tests: the full pipeline driven by in-memory sources.

mod mock_sources;
mod pipeline_run;
