//! API client library for reelcat.
//!
//! Provides the movie catalog client for the TMDB API v3.

/// TMDB movie catalog client.
pub mod tmdb;
