//! Controllers for browsing the movie catalog.
//!
//! Each controller owns an immutable state snapshot published through a
//! [`tokio::sync::watch`] channel. Callers read the latest snapshot with
//! `state()` or observe changes with `subscribe()`.

pub mod detail;
pub mod error;
pub mod favorites;
pub mod pagination;
pub mod search;

#[cfg(test)]
mod testing;

pub use detail::{DetailAggregator, DetailController, DetailState, MovieDetails};
pub use error::CoreError;
pub use favorites::{
    FavoriteRecordExt, FavoritesController, FavoritesState, FavoritesStore, SqliteFavoritesStore,
    UNKNOWN_TITLE, favorite_from_detail, favorite_from_summary,
};
pub use pagination::{
    PREFETCH_THRESHOLD, PageOutcome, PaginationController, PaginationPhase, PaginationState,
};
pub use search::{DEFAULT_DEBOUNCE, SearchController, SearchState};
