//! TMDB movie catalog client module.
//!
//! Handles HTTP requests to the TMDB API v3 movie endpoints
//! and retrieves popular lists, details, trailers and search results.

mod api;
mod client;
mod error;
mod media;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, LocalCatalogApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{CatalogClient, CatalogClientBuilder, DEFAULT_TIMEOUT};
pub use error::CatalogError;
pub use media::{IMAGE_BASE_URL, format_rating, poster_url, release_year, youtube_video_id};
pub use types::{
    Genre, MovieDetail, MovieListResponse, MovieSummary, TRAILER_KIND, Trailer, VideoListResponse,
    YOUTUBE_SITE,
};
