//! Loaders for the engine's inputs: the scoring catalog and responses.

use std::path::Path;

use mindtrack_core::models::catalog::Catalog;
use mindtrack_core::models::response::Response;
use tracing::info;

use crate::error::StorageError;
use crate::json::read_json;

pub fn load_catalog(path: &Path) -> Result<Catalog, StorageError> {
    let catalog: Catalog = read_json(path)?;
    info!(
        path = %path.display(),
        questionnaires = catalog.questionnaires.len(),
        scoring_systems = catalog.scoring_systems.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

pub fn load_responses(path: &Path) -> Result<Vec<Response>, StorageError> {
    let responses: Vec<Response> = read_json(path)?;
    info!(path = %path.display(), count = responses.len(), "loaded responses");
    Ok(responses)
}
