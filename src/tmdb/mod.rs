//! TMDB remote data source.

mod api_types;
mod client;
pub mod types;

use async_trait::async_trait;
use color_eyre::Result;

pub use client::TmdbClient;
use types::{MovieDetail, MoviePage};

/// Remote source of movie data.
///
/// Implementations own transport concerns (timeouts, retries). Failures are
/// reported as `color_eyre::Report`s whose messages name the failure kind
/// (connection, timeout, server status, not found).
#[async_trait]
pub trait RemoteDataSource: Send + Sync {
  /// Today's trending movies
  async fn fetch_trending(&self) -> Result<MoviePage>;

  /// Search movies by free-text query
  async fn search_movies(&self, query: &str) -> Result<MoviePage>;

  /// Full details for a single movie
  async fn fetch_detail(&self, id: i64) -> Result<MovieDetail>;
}
