//! View-state holders driven by repository streams.
//!
//! Each model runs a background task that consumes a repository stream and
//! publishes a `UiState` over a `watch` channel. Starting a new load aborts the
//! previous task, so only the latest request can update the state.
//!
//! # Example
//!
//! ```ignore
//! let list = MovieListModel::new(repo.clone(), &config.search);
//! list.set_query("blade runner");
//!
//! // on every redraw
//! match &list.state().state {
//!     UiState::Loading => render_spinner(),
//!     UiState::Success(movies) => render_movies(movies),
//!     UiState::Error(e) => render_error(e),
//! }
//! ```

use futures::StreamExt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::SearchConfig;
use crate::repository::{MovieRepository, MovieStream};
use crate::tmdb::types::{Movie, MovieDetail};

/// The state of a screen's data
#[derive(Debug, Clone, PartialEq)]
pub enum UiState<T> {
  /// Data is being fetched
  Loading,
  Success(T),
  /// User-facing error message
  Error(String),
}

impl<T> UiState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, UiState::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self, UiState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      UiState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      UiState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// State of the movie list screen
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
  pub state: UiState<Vec<Movie>>,
  /// Whether `state` holds search results rather than trending movies
  pub is_search_result: bool,
}

impl Default for ListState {
  fn default() -> Self {
    Self {
      state: UiState::Loading,
      is_search_result: false,
    }
  }
}

/// Background load that is aborted when dropped.
///
/// A bare `JoinHandle` detaches its task on drop, and trending loads never end
/// on their own.
struct Loader(JoinHandle<()>);

impl Drop for Loader {
  fn drop(&mut self) {
    self.0.abort();
  }
}

/// Publish every item of `stream` into `tx` until the stream ends
fn spawn_loader<T, S, F>(stream: MovieStream<T>, tx: watch::Sender<S>, apply: F) -> Loader
where
  T: Send + 'static,
  S: Send + Sync + 'static,
  F: Fn(&mut S, UiState<T>) + Send + 'static,
{
  Loader(tokio::spawn(async move {
    let mut stream = stream;
    while let Some(item) = stream.next().await {
      let next = match item {
        Ok(data) => UiState::Success(data),
        Err(e) => UiState::Error(e.message().to_string()),
      };
      tx.send_modify(|state| apply(state, next));
    }
  }))
}

/// Movie list: trending by default, search results once a query is typed.
///
/// Query changes are debounced, a query that maps to the list already shown is
/// ignored (queries too short to search all mean trending), and a new query
/// cancels the load started by the previous one.
pub struct MovieListModel {
  query_tx: watch::Sender<String>,
  refresh_tx: mpsc::UnboundedSender<()>,
  state_rx: watch::Receiver<ListState>,
  driver: JoinHandle<()>,
}

impl MovieListModel {
  /// Create the model and start loading trending movies.
  pub fn new(repo: MovieRepository, search: &SearchConfig) -> Self {
    let (query_tx, query_rx) = watch::channel(String::new());
    let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(ListState::default());

    let driver = tokio::spawn(drive_list(
      repo,
      ListOptions {
        debounce: Duration::from_millis(search.debounce_ms),
        min_query_len: search.min_query_len,
      },
      query_rx,
      refresh_rx,
      state_tx,
    ));

    Self {
      query_tx,
      refresh_tx,
      state_rx,
      driver,
    }
  }

  /// Update the search query; an empty or too-short query shows trending.
  pub fn set_query(&self, query: &str) {
    self.query_tx.send_replace(query.to_string());
  }

  pub fn clear_query(&self) {
    self.set_query("");
  }

  /// Reload trending movies, bypassing the cache.
  pub fn refresh(&self) {
    let _ = self.refresh_tx.send(());
  }

  pub fn query(&self) -> String {
    self.query_tx.borrow().clone()
  }

  pub fn state(&self) -> ListState {
    self.state_rx.borrow().clone()
  }

  #[cfg(test)]
  pub fn subscribe(&self) -> watch::Receiver<ListState> {
    self.state_rx.clone()
  }
}

impl Drop for MovieListModel {
  fn drop(&mut self) {
    self.driver.abort();
  }
}

struct ListOptions {
  debounce: Duration,
  min_query_len: usize,
}

/// What the list shows for a given query
#[derive(Debug, Clone, PartialEq)]
enum ListSource {
  Trending,
  Search(String),
}

impl ListOptions {
  fn source_for(&self, query: &str) -> ListSource {
    if query.trim().chars().count() >= self.min_query_len {
      ListSource::Search(query.to_string())
    } else {
      ListSource::Trending
    }
  }
}

async fn drive_list(
  repo: MovieRepository,
  options: ListOptions,
  mut query_rx: watch::Receiver<String>,
  mut refresh_rx: mpsc::UnboundedReceiver<()>,
  state_tx: watch::Sender<ListState>,
) {
  let load = |stream: MovieStream<Vec<Movie>>, is_search_result: bool| {
    state_tx.send_replace(ListState {
      state: UiState::Loading,
      is_search_result,
    });
    spawn_loader(stream, state_tx.clone(), move |s: &mut ListState, next| {
      s.state = next;
      s.is_search_result = is_search_result;
    })
  };

  let mut active = Some(load(repo.trending(false), false));
  let mut shown = ListSource::Trending;

  loop {
    tokio::select! {
      changed = query_rx.changed() => {
        if changed.is_err() {
          break;
        }

        // Wait for typing to settle, still serving refreshes meanwhile
        loop {
          tokio::select! {
            _ = tokio::time::sleep(options.debounce) => break,
            changed = query_rx.changed() => {
              if changed.is_err() {
                return;
              }
            }
            refresh = refresh_rx.recv() => {
              if refresh.is_none() {
                return;
              }
              debug!("Refreshing trending movies");
              active.take();
              active = Some(load(repo.trending(true), false));
              shown = ListSource::Trending;
            }
          }
        }

        let source = options.source_for(&query_rx.borrow_and_update());
        if source == shown {
          continue;
        }

        // Abort the previous load before it can publish over this one
        active.take();
        active = Some(match &source {
          ListSource::Search(query) => {
            debug!(query = %query, "Searching");
            load(repo.search(query), true)
          }
          ListSource::Trending => {
            debug!("Query cleared, showing trending movies");
            load(repo.trending(false), false)
          }
        });
        shown = source;
      }
      refresh = refresh_rx.recv() => {
        if refresh.is_none() {
          break;
        }
        debug!("Refreshing trending movies");
        active.take();
        active = Some(load(repo.trending(true), false));
        shown = ListSource::Trending;
      }
    }
  }
}

/// Single movie details screen
pub struct MovieDetailModel {
  repo: MovieRepository,
  state_tx: watch::Sender<UiState<MovieDetail>>,
  active: Option<Loader>,
}

impl MovieDetailModel {
  pub fn new(repo: MovieRepository) -> Self {
    let (state_tx, _) = watch::channel(UiState::Loading);
    Self {
      repo,
      state_tx,
      active: None,
    }
  }

  pub fn load(&mut self, id: i64, force_refresh: bool) {
    self.active.take();
    self.state_tx.send_replace(UiState::Loading);
    self.active = Some(spawn_loader(
      self.repo.detail(id, force_refresh),
      self.state_tx.clone(),
      |s: &mut UiState<MovieDetail>, next| *s = next,
    ));
  }

  pub fn state(&self) -> UiState<MovieDetail> {
    self.state_tx.borrow().clone()
  }

  #[cfg(test)]
  pub fn subscribe(&self) -> watch::Receiver<UiState<MovieDetail>> {
    self.state_tx.subscribe()
  }
}
