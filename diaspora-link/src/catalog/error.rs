//! Catalog error types.

use crate::backend::BackendError;

/// Errors that can occur while loading or persisting the location catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Fetching reference data from the backend failed
    #[error("failed to fetch catalog: {0}")]
    Backend(#[from] BackendError),

    /// Snapshot file could not be written
    #[error("snapshot error: {message}")]
    Snapshot { message: String },
}
