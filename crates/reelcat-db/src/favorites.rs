//! Favorite movie CRUD operations.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

/// A movie saved as a favorite.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteRecord {
    /// Catalog movie ID (primary key).
    pub id: u64,
    /// Movie title.
    pub title: String,
    /// Poster image path (nullable).
    pub poster_path: Option<String>,
    /// Vote average.
    pub vote_average: f64,
    /// Release date (nullable).
    pub release_date: Option<String>,
}

/// Columns selected for a `FavoriteRecord`, in field order.
const FAVORITE_COLUMNS: &str = "id, title, poster_path, vote_average, release_date";

fn row_to_favorite(row: &rusqlite::Row<'_>) -> rusqlite::Result<FavoriteRecord> {
    Ok(FavoriteRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        poster_path: row.get(2)?,
        vote_average: row.get(3)?,
        release_date: row.get(4)?,
    })
}

/// Returns whether a favorite with the given movie ID exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn favorite_exists(conn: &Connection, id: u64) -> Result<bool> {
    let count: u32 = conn
        .query_row(
            "SELECT COUNT(*) FROM favorites WHERE id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to check favorite {id}"))?;
    Ok(count > 0)
}

/// Loads a single favorite by movie ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_favorite(conn: &Connection, id: u64) -> Result<Option<FavoriteRecord>> {
    conn.query_row(
        &format!("SELECT {FAVORITE_COLUMNS} FROM favorites WHERE id = ?1"),
        rusqlite::params![id],
        row_to_favorite,
    )
    .optional()
    .with_context(|| format!("failed to load favorite {id}"))
}

/// Inserts a new favorite.
///
/// # Errors
///
/// Returns an error if a favorite with the same ID already exists
/// or the database operation fails.
pub fn insert_favorite(conn: &Connection, record: &FavoriteRecord) -> Result<()> {
    conn.execute(
        &format!("INSERT INTO favorites ({FAVORITE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
        rusqlite::params![
            record.id,
            record.title,
            record.poster_path,
            record.vote_average,
            record.release_date,
        ],
    )
    .with_context(|| format!("failed to insert favorite {}", record.id))?;
    Ok(())
}

/// Deletes a favorite. Returns `true` if a row was removed.
///
/// Deleting an absent ID is not an error.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_favorite(conn: &Connection, id: u64) -> Result<bool> {
    let rows = conn
        .execute("DELETE FROM favorites WHERE id = ?1", rusqlite::params![id])
        .with_context(|| format!("failed to delete favorite {id}"))?;
    Ok(rows > 0)
}

/// Deletes several favorites at once. Returns the number of rows removed.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_favorites(conn: &Connection, ids: &[u64]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let placeholders: Vec<String> = ids.iter().map(|_| String::from("?")).collect();
    let sql = format!(
        "DELETE FROM favorites WHERE id IN ({})",
        placeholders.join(", ")
    );

    let params: Vec<Box<dyn rusqlite::types::ToSql>> = ids
        .iter()
        .map(|id| -> Box<dyn rusqlite::types::ToSql> { Box::new(*id) })
        .collect();
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(AsRef::as_ref).collect();

    conn.execute(&sql, param_refs.as_slice())
        .with_context(|| format!("failed to delete {} favorites", ids.len()))
}

/// Loads all favorites ordered by title (byte order, then ID).
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_favorites(conn: &Connection) -> Result<Vec<FavoriteRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorites ORDER BY title, id"
        ))
        .context("failed to prepare favorites query")?;

    let rows = stmt
        .query_map([], row_to_favorite)
        .context("failed to query favorites")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read favorites rows")
}

/// Removes the favorite if it exists, otherwise inserts it.
/// Returns the new favorite state (`true` = now a favorite).
///
/// Runs inside an `IMMEDIATE` transaction so that concurrent toggles
/// of the same ID cannot both insert.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn toggle_favorite(conn: &Connection, record: &FavoriteRecord) -> Result<bool> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .context("failed to begin transaction")?;

    let removed = tx
        .execute(
            "DELETE FROM favorites WHERE id = ?1",
            rusqlite::params![record.id],
        )
        .with_context(|| format!("failed to delete favorite {}", record.id))?;

    let now_favorite = if removed > 0 {
        false
    } else {
        insert_favorite(&tx, record)?;
        true
    };

    tx.commit().context("failed to commit favorite toggle")?;
    tracing::debug!(id = record.id, now_favorite, "favorite toggled");
    Ok(now_favorite)
}
