//! Controller error type.

use reelcat_api::tmdb::CatalogError;

/// Errors surfaced by controllers and the favorites store.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum CoreError {
    /// The catalog request failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The local favorites store failed.
    #[error("favorites store error: {0:#}")]
    Store(anyhow::Error),
}

