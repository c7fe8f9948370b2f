//! In-memory catalog used by the controller tests.
#![allow(clippy::unwrap_used)]
#![allow(clippy::arithmetic_side_effects)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reelcat_api::tmdb::{CatalogApi, CatalogError, Genre, MovieDetail, MovieSummary, Trailer};
use tokio::sync::Semaphore;

/// Builds a list entry with the given id and title.
pub fn movie(id: u64, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: Some(String::from(title)),
        poster_path: Some(format!("/poster{id}.jpg")),
        overview: None,
        vote_average: Some(7.0),
        release_date: Some(String::from("2023-07-19")),
    }
}

/// Builds `count` list entries with ids starting at `first_id`.
pub fn movies(first_id: u64, count: u64) -> Vec<MovieSummary> {
    (first_id..first_id + count)
        .map(|id| movie(id, &format!("Movie {id}")))
        .collect()
}

/// Builds a detail record with an optional title.
pub fn detail(id: u64, title: Option<&str>) -> MovieDetail {
    MovieDetail {
        id,
        title: title.map(String::from),
        poster_path: Some(format!("/poster{id}.jpg")),
        overview: Some(String::from("overview")),
        vote_average: Some(8.4),
        release_date: Some(String::from("1999-10-15")),
        runtime: Some(139),
        genres: vec![Genre {
            id: 18,
            name: Some(String::from("Drama")),
        }],
    }
}

/// Builds a YouTube trailer with the given key.
pub fn trailer(key: &str) -> Trailer {
    Trailer {
        id: format!("video-{key}"),
        key: Some(String::from(key)),
        name: Some(String::from("Official Trailer")),
        site: Some(String::from("YouTube")),
        kind: Some(String::from("Trailer")),
    }
}

fn server_error() -> CatalogError {
    CatalogError::Api {
        status: 500,
        message: String::from("Internal error"),
    }
}

/// Scripted fake of the catalog API.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    pages: Mutex<VecDeque<Option<Vec<MovieSummary>>>>,
    popular_calls: Mutex<Vec<u32>>,
    popular_gate: Option<Arc<Semaphore>>,
    details: HashMap<u64, MovieDetail>,
    trailers: HashMap<u64, Vec<Trailer>>,
    failing_trailers: HashSet<u64>,
    trailer_delay: Duration,
    search_calls: Mutex<Vec<String>>,
    search_delays: HashMap<String, Duration>,
    failing_queries: HashSet<String>,
}

impl FakeCatalog {
    /// Queues popular pages; `None` entries fail with a server error.
    pub fn with_pages(pages: Vec<Option<Vec<MovieSummary>>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    /// Makes every popular fetch wait for a permit on `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.popular_gate = Some(gate);
        self
    }

    pub fn with_detail(mut self, detail: MovieDetail) -> Self {
        self.details.insert(detail.id, detail);
        self
    }

    pub fn with_trailers(mut self, id: u64, trailers: Vec<Trailer>) -> Self {
        self.trailers.insert(id, trailers);
        self
    }

    pub fn with_failing_trailers(mut self, id: u64) -> Self {
        self.failing_trailers.insert(id);
        self
    }

    /// Delays every trailer response.
    pub const fn with_trailer_delay(mut self, delay: Duration) -> Self {
        self.trailer_delay = delay;
        self
    }

    pub fn with_search_delay(mut self, query: &str, delay: Duration) -> Self {
        self.search_delays.insert(String::from(query), delay);
        self
    }

    pub fn with_failing_query(mut self, query: &str) -> Self {
        self.failing_queries.insert(String::from(query));
        self
    }

    pub fn popular_calls(&self) -> Vec<u32> {
        self.popular_calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }
}

impl CatalogApi for FakeCatalog {
    async fn fetch_popular(&self, page: u32) -> Result<Vec<MovieSummary>, CatalogError> {
        self.popular_calls.lock().unwrap().push(page);
        if let Some(gate) = &self.popular_gate {
            gate.acquire().await.unwrap().forget();
        }
        let next = self.pages.lock().unwrap().pop_front();
        match next {
            Some(Some(page)) => Ok(page),
            Some(None) => Err(server_error()),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_detail(&self, id: u64) -> Result<MovieDetail, CatalogError> {
        self.details
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                path: format!("movie/{id}"),
            })
    }

    async fn fetch_trailers(&self, id: u64) -> Result<Vec<Trailer>, CatalogError> {
        tokio::time::sleep(self.trailer_delay).await;
        if self.failing_trailers.contains(&id) {
            return Err(server_error());
        }
        Ok(self.trailers.get(&id).cloned().unwrap_or_default())
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        self.search_calls.lock().unwrap().push(String::from(query));
        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_queries.contains(query) {
            return Err(server_error());
        }
        Ok(vec![movie(1, query)])
    }
}
