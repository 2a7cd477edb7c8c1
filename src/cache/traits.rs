//! Core traits and types for the caching system.

use chrono::Utc;
use color_eyre::Result;
use futures::stream::BoxStream;

use crate::tmdb::types::{Movie, MovieDetail};

/// Epoch milliseconds at which a row was persisted
pub type CachedAt = i64;

/// Local store for trending movies and movie details.
///
/// Every row carries the `cached_at` stamp it was written with; that stamp is
/// the only input to freshness decisions. Trending rows are replaced as a
/// whole, detail rows are upserted by id.
pub trait CacheStore: Send + Sync {
  /// Trending movies ordered by rating, re-emitted after every trending mutation.
  fn observe_trending(&self) -> BoxStream<'static, Result<Vec<Movie>>>;

  /// Current trending movies ordered by rating.
  fn read_trending(&self) -> Result<Vec<Movie>>;

  /// Insert (or overwrite by id) trending movies.
  fn insert_batch(&self, movies: &[Movie], cached_at: CachedAt) -> Result<()>;

  /// Remove all trending movies.
  fn clear_trending(&self) -> Result<()>;

  /// Clear then insert as one unit; readers never see a mix of two batches.
  ///
  /// The provided version is not atomic: observers may see the empty list in
  /// between. Stores with transactions should override it.
  fn replace_trending(&self, movies: &[Movie], cached_at: CachedAt) -> Result<()> {
    self.clear_trending()?;
    self.insert_batch(movies, cached_at)
  }

  fn read_detail(&self, id: i64) -> Result<Option<MovieDetail>>;

  fn upsert_detail(&self, detail: &MovieDetail, cached_at: CachedAt) -> Result<()>;

  /// Stamp of the cached trending batch, None when empty.
  fn trending_cached_at(&self) -> Result<Option<CachedAt>>;

  fn detail_cached_at(&self, id: i64) -> Result<Option<CachedAt>>;
}

/// Source of "now" for cache stamps and freshness checks.
pub trait Clock: Send + Sync {
  fn now_millis(&self) -> CachedAt;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_millis(&self) -> CachedAt {
    Utc::now().timestamp_millis()
  }
}
