//! mindtrack-cli library root.
//!
//! Re-exports the batch and config layers so integration tests can drive
//! them directly without going through argument parsing.

pub mod batch;
pub mod config;
