//! Movie detail screen: detail and trailers joined into one result.

use std::sync::Arc;

use reelcat_api::tmdb::{CatalogApi, MovieDetail, Trailer};
use tokio::sync::watch;
use tracing::instrument;

use crate::error::CoreError;
use crate::favorites::FavoritesStore;

/// Detail of a movie together with its YouTube trailers.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
    /// Movie detail.
    pub detail: MovieDetail,
    /// YouTube trailers in catalog order.
    pub trailers: Vec<Trailer>,
}

impl MovieDetails {
    /// Trailers that can be offered for playback.
    pub fn playable_trailers(&self) -> impl Iterator<Item = &Trailer> {
        self.trailers.iter().filter(|t| t.embed_url().is_some())
    }
}

/// Fetches detail and trailers concurrently and fails as a unit.
#[derive(Debug)]
pub struct DetailAggregator<C> {
    client: Arc<C>,
}

impl<C: CatalogApi> DetailAggregator<C> {
    /// Creates an aggregator over `client`.
    #[must_use]
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Loads the detail and trailers of `id`.
    ///
    /// # Errors
    ///
    /// Returns the first error from either fetch; the other result is
    /// discarded.
    #[instrument(skip(self))]
    pub async fn load(&self, id: u64) -> Result<MovieDetails, CoreError> {
        let (detail, trailers) = tokio::try_join!(
            self.client.fetch_detail(id),
            self.client.fetch_trailers(id)
        )?;
        tracing::debug!(trailers = trailers.len(), "movie details loaded");
        Ok(MovieDetails { detail, trailers })
    }
}

/// Snapshot of the detail screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    /// Movie shown on the screen.
    pub movie_id: u64,
    /// Loaded detail and trailers; `None` until a load succeeds.
    pub details: Option<MovieDetails>,
    /// A load is in flight.
    pub is_loading: bool,
    /// Whether the movie is a favorite.
    pub is_favorite: bool,
    /// Message of the latest failure.
    pub last_error: Option<String>,
}

/// Detail screen controller: loads the movie and toggles its favorite state.
#[derive(Debug)]
pub struct DetailController<C, S> {
    aggregator: DetailAggregator<C>,
    store: Arc<S>,
    state: watch::Sender<DetailState>,
}

impl<C: CatalogApi, S: FavoritesStore> DetailController<C, S> {
    /// Creates a controller for `movie_id`. Nothing is fetched until
    /// [`Self::load`] is called.
    #[must_use]
    pub fn new(client: Arc<C>, store: Arc<S>, movie_id: u64) -> Self {
        Self {
            aggregator: DetailAggregator::new(client),
            store,
            state: watch::Sender::new(DetailState {
                movie_id,
                ..DetailState::default()
            }),
        }
    }

    /// Latest state snapshot.
    #[must_use]
    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Loads the movie and refreshes its favorite flag.
    /// Returns whether details are available afterwards.
    pub async fn load(&self) -> bool {
        let movie_id = self.state.borrow().movie_id;
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.last_error = None;
        });

        let result = self.aggregator.load(movie_id).await;
        let loaded = result.is_ok();
        self.state.send_modify(|s| {
            s.is_loading = false;
            match result {
                Ok(details) => s.details = Some(details),
                Err(e) => {
                    tracing::warn!(movie_id, error = %e, "failed to load movie details");
                    s.details = None;
                    s.last_error = Some(e.to_string());
                }
            }
        });

        self.refresh_favorite();
        loaded
    }

    /// Re-reads the favorite flag from the store.
    pub fn refresh_favorite(&self) {
        let movie_id = self.state.borrow().movie_id;
        match self.store.is_favorite(movie_id) {
            Ok(is_favorite) => {
                self.state.send_if_modified(|s| {
                    let changed = s.is_favorite != is_favorite;
                    s.is_favorite = is_favorite;
                    changed
                });
            }
            Err(e) => self.record_store_error(&e),
        }
    }

    /// Toggles the favorite state of the loaded movie.
    ///
    /// Returns the new state, or `None` when no details are loaded or the
    /// store failed.
    pub fn toggle_favorite(&self) -> Option<bool> {
        let detail = self.state.borrow().details.as_ref().map(|d| d.detail.clone());
        let Some(detail) = detail else {
            tracing::debug!("toggle ignored: details not loaded");
            return None;
        };

        match self.store.toggle(&detail) {
            Ok(now_favorite) => {
                self.state.send_modify(|s| s.is_favorite = now_favorite);
                Some(now_favorite)
            }
            Err(e) => {
                self.record_store_error(&e);
                None
            }
        }
    }

    fn record_store_error(&self, err: &CoreError) {
        tracing::warn!(error = %err, "favorites store failure");
        self.state.send_modify(|s| s.last_error = Some(err.to_string()));
    }
}
