//! NFL pick-sheet pipeline.
//!
//! Library crate exposing all modules for use by integration tests
//! and the `run_all` binary.

pub mod config;
pub mod types;
pub mod teams;
pub mod data;
pub mod model;
pub mod strategy;
pub mod engine;
pub mod storage;
