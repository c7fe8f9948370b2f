//! TMDB API response types.

use serde::{Deserialize, Deserializer};

use super::media::{format_rating, poster_url, release_year};

/// Site name of YouTube-hosted videos.
pub const YOUTUBE_SITE: &str = "YouTube";

/// Video type of trailers.
pub const TRAILER_KIND: &str = "Trailer";

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// --- Movie lists ---

/// Response from the `movie/popular` and `search/movie` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieListResponse {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Movies on this page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<MovieSummary>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// A movie as it appears in a list or search result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: Option<String>,
    /// Poster image path (relative to the image base URL).
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Vote average (0.0 - 10.0).
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Release date (YYYY-MM-DD, may be empty).
    #[serde(default)]
    pub release_date: Option<String>,
}

impl MovieSummary {
    /// Full poster image URL.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path.as_deref().map(poster_url)
    }

    /// Vote average with one decimal place (e.g. `"8.4"`).
    #[must_use]
    pub fn rating_label(&self) -> Option<String> {
        self.vote_average.map(format_rating)
    }

    /// Year part of the release date.
    #[must_use]
    pub fn release_year(&self) -> Option<u32> {
        self.release_date.as_deref().and_then(release_year)
    }
}

// --- Movie details ---

/// Response from the `movie/{movie_id}` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetail {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: Option<String>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Genres in catalog order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: Vec<Genre>,
}

impl MovieDetail {
    /// Full poster image URL.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path.as_deref().map(poster_url)
    }

    /// Vote average with one decimal place.
    #[must_use]
    pub fn rating_label(&self) -> Option<String> {
        self.vote_average.map(format_rating)
    }

    /// Comma-separated genre names. Genres without a name are skipped.
    #[must_use]
    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .filter_map(|g| g.name.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Drops the detail-only fields.
    #[must_use]
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            overview: self.overview.clone(),
            vote_average: self.vote_average,
            release_date: self.release_date.clone(),
        }
    }
}

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    #[serde(default)]
    pub name: Option<String>,
}

// --- Videos ---

/// Response from the `movie/{movie_id}/videos` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoListResponse {
    /// Videos in catalog order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Trailer>,
}

/// A video attached to a movie (trailer, teaser, featurette, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Trailer {
    /// Catalog video ID.
    pub id: String,
    /// Platform video ID (e.g. the YouTube `v` parameter).
    #[serde(default)]
    pub key: Option<String>,
    /// Video title.
    #[serde(default)]
    pub name: Option<String>,
    /// Hosting site (e.g. "YouTube", "Vimeo").
    #[serde(default)]
    pub site: Option<String>,
    /// Video type (e.g. "Trailer", "Teaser").
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Trailer {
    /// Whether the video is a trailer hosted on YouTube.
    #[must_use]
    pub fn is_youtube_trailer(&self) -> bool {
        self.site.as_deref() == Some(YOUTUBE_SITE) && self.kind.as_deref() == Some(TRAILER_KIND)
    }

    /// Whether the video can be played: hosted on YouTube with a key.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        self.site.as_deref() == Some(YOUTUBE_SITE) && self.key.is_some()
    }
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[allow(dead_code)]
    #[serde(default)]
    pub success: bool,
}
