use std::path::PathBuf;

use mindtrack_core::ids::{ResponseId, ScoringSystemId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("score ledger version {found} is newer than supported version {supported}")]
    UnsupportedLedgerVersion { found: u32, supported: u32 },

    #[error("score for response {response_id} and system {system_id} has a non-finite {field}")]
    NonFiniteScore {
        response_id: ResponseId,
        system_id: ScoringSystemId,
        field: &'static str,
    },

    #[error("score store lock poisoned")]
    Poisoned,
}
