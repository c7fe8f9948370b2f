//! Database module for locally persisted favorites.
//!
//! Uses `rusqlite` (bundled `SQLite`) to keep the user's favorite
//! movies independent of the remote catalog.

mod connection;
/// Favorite movie CRUD operations.
pub mod favorites;
mod migrations;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use connection::open_db;
pub use favorites::{
    FavoriteRecord, delete_favorite, delete_favorites, favorite_exists, find_favorite,
    insert_favorite, load_favorites, toggle_favorite,
};
pub use paths::{AppDir, app_file};
