//! Test doubles shared by repository and presentation tests.

use async_trait::async_trait;
use color_eyre::eyre::eyre;
use futures::stream::BoxStream;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::cache::{CacheStore, CachedAt, Clock, SqliteStorage};
use crate::connectivity::ConnectivityProbe;
use crate::repository::MovieRepository;
use crate::tmdb::types::{Movie, MovieDetail, MoviePage};
use crate::tmdb::RemoteDataSource;

pub const NOW: i64 = 1_700_000_000_000;
pub const MINUTE: i64 = 60 * 1000;

type Canned<T> = Mutex<Option<Result<T, String>>>;

/// Remote returning canned responses and counting calls
#[derive(Default)]
pub struct FakeRemote {
  trending: Canned<Vec<Movie>>,
  search: Canned<Vec<Movie>>,
  detail: Canned<MovieDetail>,
  trending_calls: AtomicUsize,
  detail_calls: AtomicUsize,
  search_queries: Mutex<Vec<String>>,
}

impl FakeRemote {
  pub fn trending_ok(&self, movies: Vec<Movie>) {
    *self.trending.lock().unwrap() = Some(Ok(movies));
  }

  pub fn trending_err(&self, message: &str) {
    *self.trending.lock().unwrap() = Some(Err(message.to_string()));
  }

  pub fn search_ok(&self, movies: Vec<Movie>) {
    *self.search.lock().unwrap() = Some(Ok(movies));
  }

  pub fn search_err(&self, message: &str) {
    *self.search.lock().unwrap() = Some(Err(message.to_string()));
  }

  pub fn detail_ok(&self, detail: MovieDetail) {
    *self.detail.lock().unwrap() = Some(Ok(detail));
  }

  pub fn detail_err(&self, message: &str) {
    *self.detail.lock().unwrap() = Some(Err(message.to_string()));
  }

  pub fn trending_calls(&self) -> usize {
    self.trending_calls.load(Ordering::SeqCst)
  }

  pub fn detail_calls(&self) -> usize {
    self.detail_calls.load(Ordering::SeqCst)
  }

  pub fn search_queries(&self) -> Vec<String> {
    self.search_queries.lock().unwrap().clone()
  }
}

fn answer<T: Clone>(canned: &Canned<T>, what: &str) -> color_eyre::Result<T> {
  match canned.lock().unwrap().clone() {
    Some(Ok(value)) => Ok(value),
    Some(Err(message)) => Err(eyre!(message)),
    None => Err(eyre!("unexpected {} call", what)),
  }
}

pub fn page(results: Vec<Movie>) -> MoviePage {
  MoviePage {
    page: 1,
    total_pages: 1,
    total_results: results.len() as u32,
    results,
  }
}

#[async_trait]
impl RemoteDataSource for FakeRemote {
  async fn fetch_trending(&self) -> color_eyre::Result<MoviePage> {
    self.trending_calls.fetch_add(1, Ordering::SeqCst);
    answer(&self.trending, "trending").map(page)
  }

  async fn search_movies(&self, query: &str) -> color_eyre::Result<MoviePage> {
    self.search_queries.lock().unwrap().push(query.to_string());
    answer(&self.search, "search").map(page)
  }

  async fn fetch_detail(&self, _id: i64) -> color_eyre::Result<MovieDetail> {
    self.detail_calls.fetch_add(1, Ordering::SeqCst);
    answer(&self.detail, "detail")
  }
}

pub struct FakeProbe(AtomicBool);

impl FakeProbe {
  pub fn set_online(&self, online: bool) {
    self.0.store(online, Ordering::SeqCst);
  }
}

#[async_trait]
impl ConnectivityProbe for FakeProbe {
  async fn is_online(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

pub struct FixedClock(AtomicI64);

impl Clock for FixedClock {
  fn now_millis(&self) -> CachedAt {
    self.0.load(Ordering::SeqCst)
  }
}

pub struct Harness {
  pub remote: Arc<FakeRemote>,
  pub store: Arc<SqliteStorage>,
  pub probe: Arc<FakeProbe>,
  pub repo: MovieRepository,
}

/// Repository over an in-memory store, online probe and a clock fixed at `NOW`
pub fn harness() -> Harness {
  build_harness(|store| store)
}

/// Like `harness`, but every trending replace fails as if the database were locked
pub fn locked_harness() -> Harness {
  build_harness(|store| Arc::new(LockedStore(store)))
}

fn build_harness(wrap: impl FnOnce(Arc<SqliteStorage>) -> Arc<dyn CacheStore>) -> Harness {
  let remote = Arc::new(FakeRemote::default());
  let store = Arc::new(SqliteStorage::open_in_memory().unwrap());
  let probe = Arc::new(FakeProbe(AtomicBool::new(true)));
  let repo = MovieRepository::new(remote.clone(), wrap(store.clone()), probe.clone())
    .with_clock(Arc::new(FixedClock(AtomicI64::new(NOW))));

  Harness {
    remote,
    store,
    probe,
    repo,
  }
}

/// Store whose trending replace always fails; everything else hits SQLite
struct LockedStore(Arc<SqliteStorage>);

impl CacheStore for LockedStore {
  fn observe_trending(&self) -> BoxStream<'static, color_eyre::Result<Vec<Movie>>> {
    self.0.observe_trending()
  }

  fn read_trending(&self) -> color_eyre::Result<Vec<Movie>> {
    self.0.read_trending()
  }

  fn insert_batch(&self, movies: &[Movie], cached_at: CachedAt) -> color_eyre::Result<()> {
    self.0.insert_batch(movies, cached_at)
  }

  fn clear_trending(&self) -> color_eyre::Result<()> {
    self.0.clear_trending()
  }

  fn replace_trending(&self, _movies: &[Movie], _cached_at: CachedAt) -> color_eyre::Result<()> {
    Err(eyre!("database is locked"))
  }

  fn read_detail(&self, id: i64) -> color_eyre::Result<Option<MovieDetail>> {
    self.0.read_detail(id)
  }

  fn upsert_detail(&self, detail: &MovieDetail, cached_at: CachedAt) -> color_eyre::Result<()> {
    self.0.upsert_detail(detail, cached_at)
  }

  fn trending_cached_at(&self) -> color_eyre::Result<Option<CachedAt>> {
    self.0.trending_cached_at()
  }

  fn detail_cached_at(&self, id: i64) -> color_eyre::Result<Option<CachedAt>> {
    self.0.detail_cached_at(id)
  }
}

pub fn movie(id: i64, title: &str) -> Movie {
  Movie {
    id,
    title: title.to_string(),
    overview: "Test overview".to_string(),
    poster_path: Some("/test.jpg".to_string()),
    backdrop_path: Some("/backdrop.jpg".to_string()),
    release_date: "2023-01-01".to_string(),
    vote_average: 8.5,
    vote_count: 1000,
  }
}

pub fn detail(id: i64, title: &str) -> MovieDetail {
  MovieDetail {
    id,
    title: title.to_string(),
    overview: "Test overview".to_string(),
    poster_path: Some("/test.jpg".to_string()),
    backdrop_path: Some("/backdrop.jpg".to_string()),
    release_date: "2023-01-01".to_string(),
    vote_average: 8.5,
    vote_count: 1000,
    runtime: Some(120),
    genres: Vec::new(),
    homepage: None,
    budget: 1_000_000,
    revenue: 2_000_000,
    status: "Released".to_string(),
    tagline: None,
    production_companies: Vec::new(),
    production_countries: Vec::new(),
    spoken_languages: Vec::new(),
    imdb_id: None,
    original_title: None,
    origin_country: Vec::new(),
    adult: false,
    popularity: 1.0,
    video: false,
    belongs_to_collection: None,
  }
}

pub fn titles(movies: &[Movie]) -> Vec<&str> {
  movies.iter().map(|m| m.title.as_str()).collect()
}
