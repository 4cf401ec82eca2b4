//! mindtrack-core
//!
//! Pure domain types for questionnaire scoring: questionnaires, responses,
//! scoring systems and their rules, and the persisted score records.
//! No I/O. This is the shared vocabulary of the MindTrack crates.

pub mod error;
pub mod ids;
pub mod models;
