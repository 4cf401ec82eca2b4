//! mindtrack-storage
//!
//! Persistence for scores and the JSON inputs the engine scores. Stores are
//! keyed by (response, scoring system) and upsert atomically.

pub mod error;
pub mod file;
pub mod inputs;
pub mod json;
pub mod ledger;
pub mod memory;
pub mod store;

pub use file::JsonFileScoreStore;
pub use memory::MemoryScoreStore;
pub use store::ScoreStore;
