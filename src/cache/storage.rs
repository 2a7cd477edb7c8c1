//! SQLite implementation of the movie cache.

use color_eyre::{eyre::eyre, Result};
use futures::stream::{self, BoxStream, StreamExt};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::traits::{CacheStore, CachedAt};
use crate::tmdb::types::{Movie, MovieDetail};

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS movies (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    overview TEXT NOT NULL,
    poster_path TEXT,
    backdrop_path TEXT,
    release_date TEXT NOT NULL,
    vote_average REAL NOT NULL,
    vote_count INTEGER NOT NULL,
    is_trending INTEGER NOT NULL DEFAULT 0,
    cached_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_movies_trending
    ON movies(is_trending, vote_average DESC);

-- Nested lists and the collection are JSON blobs
CREATE TABLE IF NOT EXISTS movie_details (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    overview TEXT NOT NULL,
    poster_path TEXT,
    backdrop_path TEXT,
    release_date TEXT NOT NULL,
    vote_average REAL NOT NULL,
    vote_count INTEGER NOT NULL,
    runtime INTEGER,
    genres TEXT NOT NULL,
    homepage TEXT,
    budget INTEGER NOT NULL,
    revenue INTEGER NOT NULL,
    status TEXT NOT NULL,
    tagline TEXT,
    production_companies TEXT NOT NULL,
    production_countries TEXT NOT NULL,
    spoken_languages TEXT NOT NULL,
    imdb_id TEXT,
    original_title TEXT,
    origin_country TEXT NOT NULL,
    adult INTEGER NOT NULL,
    popularity REAL NOT NULL,
    video INTEGER NOT NULL,
    belongs_to_collection TEXT,
    cached_at INTEGER NOT NULL
);
"#;

const SELECT_TRENDING: &str = "SELECT id, title, overview, poster_path, backdrop_path, release_date,
        vote_average, vote_count
   FROM movies WHERE is_trending = 1
   ORDER BY vote_average DESC, id ASC";

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Arc<Mutex<Connection>>,
  /// Bumped after every committed trending mutation
  trending_version: watch::Sender<u64>,
}

impl SqliteStorage {
  /// Open (or create) the cache database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Private in-memory database; contents vanish with the storage.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    let (trending_version, _) = watch::channel(0);

    Ok(Self {
      conn: Arc::new(Mutex::new(conn)),
      trending_version,
    })
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
    lock(&self.conn)
  }

  fn notify_trending_changed(&self) {
    self.trending_version.send_modify(|v| *v = v.wrapping_add(1));
  }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
  conn
    .lock()
    .map_err(|e| eyre!("Cache lock poisoned: {}", e))
}

fn select_trending(conn: &Connection) -> Result<Vec<Movie>> {
  let mut stmt = conn
    .prepare(SELECT_TRENDING)
    .map_err(|e| eyre!("Failed to prepare trending query on cache database: {}", e))?;

  let movies = stmt
    .query_map([], movie_from_row)
    .map_err(|e| eyre!("Failed to query trending movies from cache database: {}", e))?
    .collect::<rusqlite::Result<Vec<_>>>()
    .map_err(|e| eyre!("Failed to read trending movie row from cache database: {}", e))?;

  Ok(movies)
}

fn insert_movies(conn: &Connection, movies: &[Movie], cached_at: CachedAt) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT OR REPLACE INTO movies (id, title, overview, poster_path, backdrop_path,
       release_date, vote_average, vote_count, is_trending, cached_at)
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
  )?;

  for m in movies {
    stmt.execute(params![
      m.id,
      m.title,
      m.overview,
      m.poster_path,
      m.backdrop_path,
      m.release_date,
      m.vote_average,
      m.vote_count,
      cached_at,
    ])?;
  }

  Ok(())
}

fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
  Ok(Movie {
    id: row.get(0)?,
    title: row.get(1)?,
    overview: row.get(2)?,
    poster_path: row.get(3)?,
    backdrop_path: row.get(4)?,
    release_date: row.get(5)?,
    vote_average: row.get(6)?,
    vote_count: row.get(7)?,
  })
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
  serde_json::to_string(value).map_err(|e| eyre!("Failed to serialize cache blob: {}", e))
}

/// Decode a JSON blob, degrading to the default on corrupt data.
fn decode_or_default<T: DeserializeOwned + Default>(id: i64, column: &str, blob: &str) -> T {
  serde_json::from_str(blob).unwrap_or_else(|e| {
    warn!(id, column, error = %e, "Discarding undecodable cache blob");
    T::default()
  })
}

impl CacheStore for SqliteStorage {
  fn observe_trending(&self) -> BoxStream<'static, Result<Vec<Movie>>> {
    let conn = Arc::clone(&self.conn);
    // Subscribe now so mutations made before the first poll are not lost.
    let rx = self.trending_version.subscribe();

    stream::unfold((conn, rx, true), |(conn, mut rx, first)| async move {
      if !first && rx.changed().await.is_err() {
        return None;
      }
      let _seen = *rx.borrow_and_update();
      let movies = lock(&conn).and_then(|c| select_trending(&c));
      Some((movies, (conn, rx, false)))
    })
    .boxed()
  }

  fn read_trending(&self) -> Result<Vec<Movie>> {
    let conn = self.lock()?;
    select_trending(&conn)
  }

  fn insert_batch(&self, movies: &[Movie], cached_at: CachedAt) -> Result<()> {
    {
      let conn = self.lock()?;
      insert_movies(&conn, movies, cached_at)
        .map_err(|e| eyre!("Failed to insert movies into cache database: {}", e))?;
    }
    self.notify_trending_changed();
    Ok(())
  }

  fn clear_trending(&self) -> Result<()> {
    {
      let conn = self.lock()?;
      conn
        .execute("DELETE FROM movies WHERE is_trending = 1", [])
        .map_err(|e| eyre!("Failed to clear trending movies in cache database: {}", e))?;
    }
    self.notify_trending_changed();
    Ok(())
  }

  fn replace_trending(&self, movies: &[Movie], cached_at: CachedAt) -> Result<()> {
    {
      let mut conn = self.lock()?;
      let tx = conn
        .transaction()
        .map_err(|e| eyre!("Failed to begin cache database transaction: {}", e))?;

      tx.execute("DELETE FROM movies WHERE is_trending = 1", [])
        .map_err(|e| eyre!("Failed to clear trending movies in cache database: {}", e))?;
      insert_movies(&tx, movies, cached_at)
        .map_err(|e| eyre!("Failed to insert movies into cache database: {}", e))?;

      tx.commit()
        .map_err(|e| eyre!("Failed to commit cache database transaction: {}", e))?;
    }
    debug!(count = movies.len(), cached_at, "Replaced trending movies");
    self.notify_trending_changed();
    Ok(())
  }

  fn read_detail(&self, id: i64) -> Result<Option<MovieDetail>> {
    let conn = self.lock()?;

    conn
      .query_row(
        "SELECT id, title, overview, poster_path, backdrop_path, release_date,
                vote_average, vote_count, runtime, genres, homepage, budget, revenue,
                status, tagline, production_companies, production_countries,
                spoken_languages, imdb_id, original_title, origin_country, adult,
                popularity, video, belongs_to_collection
           FROM movie_details WHERE id = ?",
        params![id],
        |row| {
          let genres: String = row.get(9)?;
          let companies: String = row.get(15)?;
          let countries: String = row.get(16)?;
          let languages: String = row.get(17)?;
          let origin_country: String = row.get(20)?;
          let collection: Option<String> = row.get(24)?;

          Ok(MovieDetail {
            id: row.get(0)?,
            title: row.get(1)?,
            overview: row.get(2)?,
            poster_path: row.get(3)?,
            backdrop_path: row.get(4)?,
            release_date: row.get(5)?,
            vote_average: row.get(6)?,
            vote_count: row.get(7)?,
            runtime: row.get(8)?,
            genres: decode_or_default(id, "genres", &genres),
            homepage: row.get(10)?,
            budget: row.get(11)?,
            revenue: row.get(12)?,
            status: row.get(13)?,
            tagline: row.get(14)?,
            production_companies: decode_or_default(id, "production_companies", &companies),
            production_countries: decode_or_default(id, "production_countries", &countries),
            spoken_languages: decode_or_default(id, "spoken_languages", &languages),
            imdb_id: row.get(18)?,
            original_title: row.get(19)?,
            origin_country: decode_or_default(id, "origin_country", &origin_country),
            adult: row.get(21)?,
            popularity: row.get(22)?,
            video: row.get(23)?,
            belongs_to_collection: collection
              .and_then(|blob| decode_or_default(id, "belongs_to_collection", &blob)),
          })
        },
      )
      .optional()
      .map_err(|e| eyre!("Failed to read movie {} from cache database: {}", id, e))
  }

  fn upsert_detail(&self, d: &MovieDetail, cached_at: CachedAt) -> Result<()> {
    let genres = encode(&d.genres)?;
    let companies = encode(&d.production_companies)?;
    let countries = encode(&d.production_countries)?;
    let languages = encode(&d.spoken_languages)?;
    let origin_country = encode(&d.origin_country)?;
    let collection = d
      .belongs_to_collection
      .as_ref()
      .map(encode)
      .transpose()?;

    let conn = self.lock()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO movie_details (id, title, overview, poster_path, backdrop_path,
           release_date, vote_average, vote_count, runtime, genres, homepage, budget, revenue,
           status, tagline, production_companies, production_countries, spoken_languages,
           imdb_id, original_title, origin_country, adult, popularity, video,
           belongs_to_collection, cached_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
          d.id,
          d.title,
          d.overview,
          d.poster_path,
          d.backdrop_path,
          d.release_date,
          d.vote_average,
          d.vote_count,
          d.runtime,
          genres,
          d.homepage,
          d.budget,
          d.revenue,
          d.status,
          d.tagline,
          companies,
          countries,
          languages,
          d.imdb_id,
          d.original_title,
          origin_country,
          d.adult,
          d.popularity,
          d.video,
          collection,
          cached_at,
        ],
      )
      .map_err(|e| eyre!("Failed to store movie {} in cache database: {}", d.id, e))?;

    Ok(())
  }

  fn trending_cached_at(&self) -> Result<Option<CachedAt>> {
    let conn = self.lock()?;
    // Oldest stamp wins if a batch was ever appended to
    conn
      .query_row(
        "SELECT MIN(cached_at) FROM movies WHERE is_trending = 1",
        [],
        |row| row.get(0),
      )
      .map_err(|e| eyre!("Failed to read trending cache time from cache database: {}", e))
  }

  fn detail_cached_at(&self, id: i64) -> Result<Option<CachedAt>> {
    let conn = self.lock()?;
    conn
      .query_row(
        "SELECT cached_at FROM movie_details WHERE id = ?",
        params![id],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache time for movie {} from cache database: {}", id, e))
  }
}
