//! Favorites: store abstraction, toggle and the favorites list screen.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use reelcat_api::tmdb::{MovieDetail, MovieSummary};
use reelcat_db::FavoriteRecord;
use rusqlite::Connection;
use tokio::sync::watch;

use crate::error::CoreError;

/// Title stored for movies the catalog returned without one.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Projects a movie detail into a favorite record.
#[must_use]
pub fn favorite_from_detail(detail: &MovieDetail) -> FavoriteRecord {
    FavoriteRecord {
        id: detail.id,
        title: detail
            .title
            .clone()
            .unwrap_or_else(|| String::from(UNKNOWN_TITLE)),
        poster_path: detail.poster_path.clone(),
        vote_average: detail.vote_average.unwrap_or(0.0),
        release_date: detail.release_date.clone(),
    }
}

/// Projects a list entry into a favorite record.
#[must_use]
pub fn favorite_from_summary(movie: &MovieSummary) -> FavoriteRecord {
    FavoriteRecord {
        id: movie.id,
        title: movie
            .title
            .clone()
            .unwrap_or_else(|| String::from(UNKNOWN_TITLE)),
        poster_path: movie.poster_path.clone(),
        vote_average: movie.vote_average.unwrap_or(0.0),
        release_date: movie.release_date.clone(),
    }
}

/// Display conversion for stored favorites.
pub trait FavoriteRecordExt {
    /// Converts the record back into a list entry (without overview).
    fn to_summary(&self) -> MovieSummary;
}

impl FavoriteRecordExt for FavoriteRecord {
    fn to_summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: Some(self.title.clone()),
            poster_path: self.poster_path.clone(),
            overview: None,
            vote_average: Some(self.vote_average),
            release_date: self.release_date.clone(),
        }
    }
}

/// Local favorites persistence keyed by movie id.
///
/// Implementations must keep at most one record per id, including when
/// the same id is toggled from several threads.
pub trait FavoritesStore: Send + Sync {
    /// Whether `id` is a favorite.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the store cannot be read.
    fn is_favorite(&self, id: u64) -> Result<bool, CoreError>;

    /// The stored favorite for `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the store cannot be read.
    fn find(&self, id: u64) -> Result<Option<FavoriteRecord>, CoreError>;

    /// Removes the favorite for `detail.id` if present, otherwise inserts it.
    /// Returns the new favorite state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the store cannot be updated.
    fn toggle(&self, detail: &MovieDetail) -> Result<bool, CoreError>;

    /// Same as [`Self::toggle`], starting from a list entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the store cannot be updated.
    fn toggle_summary(&self, movie: &MovieSummary) -> Result<bool, CoreError>;

    /// All favorites sorted by title.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the store cannot be read.
    fn list(&self) -> Result<Vec<FavoriteRecord>, CoreError>;

    /// Removes `id`. Absent ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the store cannot be updated.
    fn remove(&self, id: u64) -> Result<(), CoreError>;

    /// Removes every id in `ids`. Returns how many were present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the store cannot be updated.
    fn remove_many(&self, ids: &[u64]) -> Result<usize, CoreError>;
}

/// SQLite-backed [`FavoritesStore`]. All access is serialized through a mutex.
#[derive(Debug)]
pub struct SqliteFavoritesStore {
    conn: Mutex<Connection>,
}

impl SqliteFavoritesStore {
    /// Opens (and migrates) the favorites database under `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the database cannot be opened.
    pub fn open(dir: Option<&PathBuf>) -> Result<Self, CoreError> {
        let conn = reelcat_db::open_db(dir).map_err(CoreError::Store)?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already migrated connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Store(anyhow::anyhow!("favorites connection lock poisoned")))
    }

    fn toggle_record(&self, record: &FavoriteRecord) -> Result<bool, CoreError> {
        let conn = self.conn()?;
        let now_favorite =
            reelcat_db::toggle_favorite(&conn, record).map_err(CoreError::Store)?;
        tracing::info!(
            id = record.id,
            title = %record.title,
            now_favorite,
            "favorite toggled"
        );
        Ok(now_favorite)
    }
}

impl FavoritesStore for SqliteFavoritesStore {
    fn is_favorite(&self, id: u64) -> Result<bool, CoreError> {
        reelcat_db::favorite_exists(&*self.conn()?, id).map_err(CoreError::Store)
    }

    fn find(&self, id: u64) -> Result<Option<FavoriteRecord>, CoreError> {
        reelcat_db::find_favorite(&*self.conn()?, id).map_err(CoreError::Store)
    }

    fn toggle(&self, detail: &MovieDetail) -> Result<bool, CoreError> {
        self.toggle_record(&favorite_from_detail(detail))
    }

    fn toggle_summary(&self, movie: &MovieSummary) -> Result<bool, CoreError> {
        self.toggle_record(&favorite_from_summary(movie))
    }

    fn list(&self) -> Result<Vec<FavoriteRecord>, CoreError> {
        reelcat_db::load_favorites(&*self.conn()?).map_err(CoreError::Store)
    }

    fn remove(&self, id: u64) -> Result<(), CoreError> {
        let removed = reelcat_db::delete_favorite(&*self.conn()?, id).map_err(CoreError::Store)?;
        tracing::debug!(id, removed, "favorite removed");
        Ok(())
    }

    fn remove_many(&self, ids: &[u64]) -> Result<usize, CoreError> {
        reelcat_db::delete_favorites(&*self.conn()?, ids).map_err(CoreError::Store)
    }
}

/// Snapshot of the favorites list screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesState {
    /// Favorites sorted by title.
    pub favorites: Vec<FavoriteRecord>,
    /// Message of the latest store failure.
    pub last_error: Option<String>,
}

/// Favorites list controller. Every mutation re-queries the store.
#[derive(Debug)]
pub struct FavoritesController<S> {
    store: Arc<S>,
    state: watch::Sender<FavoritesState>,
}

impl<S: FavoritesStore> FavoritesController<S> {
    /// Creates a controller with an empty list; call [`Self::refresh`] to load.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: watch::Sender::new(FavoritesState::default()),
        }
    }

    /// Latest state snapshot.
    #[must_use]
    pub fn state(&self) -> FavoritesState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FavoritesState> {
        self.state.subscribe()
    }

    /// Reloads the list from the store.
    pub fn refresh(&self) {
        match self.store.list() {
            Ok(favorites) => self.state.send_modify(|s| {
                s.favorites = favorites;
                s.last_error = None;
            }),
            Err(e) => self.record_error(&e),
        }
    }

    /// Toggles a movie from a list row. Returns the new state.
    pub fn toggle(&self, movie: &MovieSummary) -> Option<bool> {
        let result = self.store.toggle_summary(movie);
        self.after_mutation(result)
    }

    /// Removes `id` from the favorites.
    pub fn remove(&self, id: u64) {
        let result = self.store.remove(id);
        self.after_mutation(result);
    }

    /// Removes the favorites at the given list positions. Positions outside
    /// the current list are ignored.
    pub fn remove_at(&self, offsets: &[usize]) {
        let ids: Vec<u64> = {
            let state = self.state.borrow();
            offsets
                .iter()
                .filter_map(|&i| state.favorites.get(i).map(|f| f.id))
                .collect()
        };
        if ids.is_empty() {
            return;
        }
        let result = self.store.remove_many(&ids);
        self.after_mutation(result);
    }

    fn after_mutation<T>(&self, result: Result<T, CoreError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.refresh();
                Some(value)
            }
            Err(e) => {
                self.record_error(&e);
                None
            }
        }
    }

    fn record_error(&self, err: &CoreError) {
        tracing::warn!(error = %err, "favorites store failure");
        self.state.send_modify(|s| s.last_error = Some(err.to_string()));
    }
}
