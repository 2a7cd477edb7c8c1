//! Movie repository: stale-while-revalidate over the TMDB API and the local cache.
//!
//! Reads go through the cache first. Cached data older than the TTL triggers a
//! network refresh; when the refresh fails the stale data keeps being served
//! and an error only surfaces if there is nothing cached to fall back on.
//!
//! - `trending` is a live subscription on the cached trending batch and
//!   re-emits after every replace, including replaces made by other calls.
//! - `detail` and `search` emit exactly one item (or one error).
//!
//! Calls are independent: concurrent refreshes are not de-duplicated and the
//! last trending replace wins.

use chrono::Duration;
use color_eyre::eyre::WrapErr;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, CachedAt, Clock, SystemClock};
use crate::connectivity::ConnectivityProbe;
use crate::error::{MovieError, Result};
use crate::tmdb::types::{Movie, MovieDetail};
use crate::tmdb::RemoteDataSource;

const NO_CACHED_TRENDING: &str = "No internet connection and no cached data available";
const NO_CACHED_DETAIL: &str = "No internet connection and no cached movie details available";
const SEARCH_OFFLINE: &str =
  "No internet connection. Search requires an active internet connection.";

/// Stream of repository results; errors end the stream.
pub type MovieStream<T> = BoxStream<'static, Result<T>>;

#[derive(Clone)]
pub struct MovieRepository {
  remote: Arc<dyn RemoteDataSource>,
  store: Arc<dyn CacheStore>,
  probe: Arc<dyn ConnectivityProbe>,
  clock: Arc<dyn Clock>,
  /// How long before cached data is considered stale
  ttl: Duration,
}

impl MovieRepository {
  pub fn new(
    remote: Arc<dyn RemoteDataSource>,
    store: Arc<dyn CacheStore>,
    probe: Arc<dyn ConnectivityProbe>,
  ) -> Self {
    Self {
      remote,
      store,
      probe,
      clock: Arc::new(SystemClock),
      ttl: Duration::minutes(5),
    }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  #[cfg(test)]
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  fn is_fresh(&self, cached_at: CachedAt) -> bool {
    self.clock.now_millis() - cached_at < self.ttl.num_milliseconds()
  }

  /// Trending movies, highest rated first.
  pub fn trending(&self, force_refresh: bool) -> MovieStream<Vec<Movie>> {
    let repo = self.clone();

    stream::once(async move { repo.open_trending(force_refresh).await })
      .flat_map(|opened| match opened {
        Ok(observed) => observed,
        Err(e) => stream::once(future::ready(Err(e))).boxed(),
      })
      .boxed()
  }

  async fn open_trending(&self, force_refresh: bool) -> Result<MovieStream<Vec<Movie>>> {
    info!(force_refresh, "Loading trending movies");

    // Subscribe before refreshing so the replace below is observed.
    let observed = self
      .store
      .observe_trending()
      .map(|read| read.map_err(|e| MovieError::from_report(&e)))
      .boxed();

    let cached_at = self.store.trending_cached_at().unwrap_or_else(|e| {
      warn!(error = %format!("{:#}", e), "Could not read trending cache time");
      None
    });
    let should_refresh = force_refresh || !cached_at.is_some_and(|t| self.is_fresh(t));
    debug!(should_refresh, ?cached_at, "Trending cache check");

    if !should_refresh {
      info!("Using cached trending movies (cache is valid)");
      return Ok(observed);
    }

    if let Err(report) = self.refresh_trending().await {
      warn!(error = %format!("{:#}", report), "Failed to refresh trending movies");

      let online = self.probe.is_online().await;
      let cached = self.store.read_trending().unwrap_or_default();
      if cached.is_empty() {
        return Err(if online {
          MovieError::from_report(&report)
        } else {
          MovieError::Network(NO_CACHED_TRENDING.to_string())
        });
      }
      info!(count = cached.len(), online, "Serving stale trending movies");
    }

    Ok(observed)
  }

  async fn refresh_trending(&self) -> color_eyre::Result<()> {
    let page = self
      .remote
      .fetch_trending()
      .await
      .wrap_err("Failed to fetch trending movies")?;
    info!(
      count = page.results.len(),
      page = page.page,
      total_pages = page.total_pages,
      "Fetched trending movies"
    );

    self
      .store
      .replace_trending(&page.results, self.clock.now_millis())
  }

  /// Details for one movie; emits once.
  pub fn detail(&self, id: i64, force_refresh: bool) -> MovieStream<MovieDetail> {
    let repo = self.clone();
    stream::once(async move { repo.load_detail(id, force_refresh).await }).boxed()
  }

  async fn load_detail(&self, id: i64, force_refresh: bool) -> Result<MovieDetail> {
    info!(id, force_refresh, "Loading movie details");

    if !force_refresh {
      if let Some(cached) = self.fresh_detail(id) {
        info!(id, "Using cached movie details");
        return Ok(cached);
      }
    }

    match self.refresh_detail(id).await {
      Ok(detail) => Ok(detail),
      Err(report) => {
        warn!(id, error = %format!("{:#}", report), "Failed to fetch movie details");

        let online = self.probe.is_online().await;
        match self.store.read_detail(id) {
          Ok(Some(cached)) => {
            info!(id, online, "Serving stale movie details");
            Ok(cached)
          }
          _ if !online => Err(MovieError::Network(NO_CACHED_DETAIL.to_string())),
          _ => Err(MovieError::from_report(&report)),
        }
      }
    }
  }

  fn fresh_detail(&self, id: i64) -> Option<MovieDetail> {
    let cached_at = self.store.detail_cached_at(id).ok().flatten()?;
    let fresh = self.is_fresh(cached_at);
    debug!(id, fresh, cached_at, "Detail cache check");
    if !fresh {
      return None;
    }
    self.store.read_detail(id).ok().flatten()
  }

  async fn refresh_detail(&self, id: i64) -> color_eyre::Result<MovieDetail> {
    let detail = self
      .remote
      .fetch_detail(id)
      .await
      .wrap_err_with(|| format!("Failed to fetch details for movie {}", id))?;

    self.store.upsert_detail(&detail, self.clock.now_millis())?;
    info!(id, title = %detail.title, "Fetched and cached movie details");
    Ok(detail)
  }

  /// Online-only search; never reads or writes the cache. Emits once.
  pub fn search(&self, query: &str) -> MovieStream<Vec<Movie>> {
    let repo = self.clone();
    let query = query.to_string();

    stream::once(async move {
      info!(query = %query, "Searching movies");
      match repo.remote.search_movies(&query).await {
        Ok(page) => {
          info!(
            query = %query,
            count = page.results.len(),
            total = page.total_results,
            "Search returned"
          );
          Ok(page.results)
        }
        Err(report) => {
          warn!(query = %query, error = %format!("{:#}", report), "Search failed");
          if repo.probe.is_online().await {
            Err(MovieError::from_report(&report))
          } else {
            Err(MovieError::Network(SEARCH_OFFLINE.to_string()))
          }
        }
      }
    })
    .boxed()
  }
}
