//! `CatalogClient` - TMDB movie catalog client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tracing::instrument;
use url::Url;

use super::api::CatalogApi;
use super::error::{CatalogError, NOT_FOUND_STATUS_CODE};
use super::types::{
    MovieDetail, MovieListResponse, MovieSummary, TmdbErrorResponse, Trailer, VideoListResponse,
};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Query parameter carrying the API key.
const API_KEY_PARAM: &str = "api_key";

/// TMDB movie catalog client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CatalogClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key sent as a query parameter.
    api_key: String,
    /// Optional response language (e.g. "en-US").
    language: Option<String>,
}

/// Builder for `CatalogClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CatalogClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    language: Option<String>,
    timeout: Option<Duration>,
}

impl CatalogClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            language: None,
            timeout: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the response language (default: catalog default).
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the request timeout (default: 15s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<CatalogClient> {
        let api_key = self.api_key.context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            with_trailing_slash(url)
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(CatalogClient {
            http_client,
            base_url,
            api_key,
            language: self.language,
        })
    }
}

impl CatalogClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::new()
    }

    /// Sends a GET request with the API key and decodes the JSON body.
    #[instrument(skip_all, fields(path = path))]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| CatalogError::InvalidUrl {
                path: String::from(path),
                source,
            })?;

        let mut params: Vec<(&str, String)> = Vec::with_capacity(query.len().saturating_add(2));
        params.push((API_KEY_PARAM, self.api_key.clone()));
        if let Some(ref language) = self.language {
            params.push(("language", language.clone()));
        }
        params.extend_from_slice(query);

        // The request URL carries the API key; keep it out of the error chain.
        let network_error = |source: reqwest::Error| CatalogError::Network {
            path: String::from(path),
            source: source.without_url(),
        };

        let request = self
            .http_client
            .get(url)
            .query(&params)
            .build()
            .map_err(network_error)?;

        tracing::debug!(url = %redact_api_key(request.url()), "catalog API request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(network_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            let error_response = serde_json::from_str::<TmdbErrorResponse>(&body).ok();

            let not_found = status == StatusCode::NOT_FOUND
                || error_response
                    .as_ref()
                    .is_some_and(|e| e.status_code == NOT_FOUND_STATUS_CODE);
            if not_found {
                tracing::warn!(%status, "catalog record not found");
                return Err(CatalogError::NotFound {
                    path: String::from(path),
                });
            }

            let message = error_response.map_or(body, |e| e.status_message);
            tracing::warn!(%status, %message, "catalog API error");
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(network_error)?;
        serde_json::from_str(&body).map_err(|source| {
            tracing::warn!(error = %source, "catalog response did not decode");
            CatalogError::Decode {
                path: String::from(path),
                source,
            }
        })
    }
}

/// Appends `/` to the path so `Url::join` keeps the last segment (`/3`).
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Replaces the API key value in a URL for logging.
fn redact_api_key(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == API_KEY_PARAM {
                String::from("***")
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}

impl CatalogApi for CatalogClient {
    #[instrument(skip_all, fields(page = page))]
    async fn fetch_popular(&self, page: u32) -> Result<Vec<MovieSummary>, CatalogError> {
        let query = [("page", page.to_string())];
        let response: MovieListResponse = self.get_json("movie/popular", &query).await?;
        tracing::debug!(
            page = response.page,
            total_pages = response.total_pages,
            count = response.results.len(),
            "fetched popular movies"
        );
        Ok(response.results)
    }

    #[instrument(skip_all, fields(id = id))]
    async fn fetch_detail(&self, id: u64) -> Result<MovieDetail, CatalogError> {
        let path = format!("movie/{id}");
        self.get_json(&path, &[]).await
    }

    #[instrument(skip_all, fields(id = id))]
    async fn fetch_trailers(&self, id: u64) -> Result<Vec<Trailer>, CatalogError> {
        let path = format!("movie/{id}/videos");
        let response: VideoListResponse = self.get_json(&path, &[]).await?;
        let trailers: Vec<Trailer> = response
            .results
            .into_iter()
            .filter(Trailer::is_youtube_trailer)
            .collect();
        tracing::debug!(id, count = trailers.len(), "fetched trailers");
        Ok(trailers)
    }

    #[instrument(skip_all)]
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        let params = [("query", String::from(query))];
        let response: MovieListResponse = self.get_json("search/movie", &params).await?;
        tracing::debug!(
            query,
            count = response.results.len(),
            total_results = response.total_results,
            "search completed"
        );
        Ok(response.results)
    }
}
