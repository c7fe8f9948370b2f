//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::CatalogError;
use super::types::{MovieDetail, MovieSummary, Trailer};

/// Movie catalog API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Fetches one page (1-based) of popular movies.
    ///
    /// An empty list means there are no more pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn fetch_popular(&self, page: u32) -> Result<Vec<MovieSummary>, CatalogError>;

    /// Fetches the details of a single movie.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the catalog has no such movie,
    /// or another error if the HTTP request or JSON decoding fails.
    async fn fetch_detail(&self, id: u64) -> Result<MovieDetail, CatalogError>;

    /// Fetches the YouTube trailers of a movie, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn fetch_trailers(&self, id: u64) -> Result<Vec<Trailer>, CatalogError>;

    /// Searches movies by title.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError>;
}
