use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::api_types::{ApiMovieDetail, ApiMoviePage};
use super::types::{MovieDetail, MoviePage};
use super::RemoteDataSource;
use crate::config::{Config, TmdbConfig};

/// Base delay for retrying server errors; doubles on every attempt
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// TMDB v3 API client
#[derive(Clone)]
pub struct TmdbClient {
  http: reqwest::Client,
  base_url: String,
  /// Bearer token; without one every request fails and cached data is served
  token: Option<String>,
  max_retries: u32,
}

impl TmdbClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = match Config::get_api_token() {
      Ok(token) => Some(token),
      Err(e) => {
        warn!(error = %e, "Starting without a TMDB token, only cached data is available");
        None
      }
    };
    Self::with_token(&config.tmdb, token)
  }

  pub fn with_token(config: &TmdbConfig, token: Option<String>) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .connect_timeout(Duration::from_secs(config.request_timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      token,
      max_retries: config.max_retries,
    })
  }

  fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", self.base_url, path))
      .map_err(|e| eyre!("Invalid TMDB url for {}: {}", path, e))?;
    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
  }

  /// GET a JSON document, retrying 5xx responses with exponential backoff
  async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
    let url = self.endpoint(path, query)?;
    let token = self.token.as_deref().ok_or_else(|| {
      eyre!(
        "TMDB server rejected {}: no API token (set MOVIESHELF_TMDB_TOKEN or TMDB_API_TOKEN)",
        path
      )
    })?;
    let mut attempt = 0u32;

    loop {
      debug!(path, attempt, "GET");
      let response = self
        .http
        .get(url.clone())
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| transport_error(path, &e))?;

      let status = response.status();
      if status.is_server_error() && attempt < self.max_retries {
        let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
        warn!(path, %status, ?delay, "TMDB server error, retrying");
        tokio::time::sleep(delay).await;
        attempt += 1;
        continue;
      }

      if !status.is_success() {
        return Err(status_error(path, status));
      }

      let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(path, &e))?;

      return serde_json::from_slice(&body)
        .map_err(|e| eyre!("Failed to decode TMDB response for {}: {}", path, e));
    }
  }
}

#[async_trait]
impl RemoteDataSource for TmdbClient {
  async fn fetch_trending(&self) -> Result<MoviePage> {
    let page: ApiMoviePage = self.get_json("/trending/movie/day", &[]).await?;
    Ok(page.into())
  }

  async fn search_movies(&self, query: &str) -> Result<MoviePage> {
    let page: ApiMoviePage = self.get_json("/search/movie", &[("query", query)]).await?;
    Ok(page.into())
  }

  async fn fetch_detail(&self, id: i64) -> Result<MovieDetail> {
    let detail: ApiMovieDetail = self.get_json(&format!("/movie/{}", id), &[]).await?;
    Ok(detail.into())
  }
}

/// Word transport failures so they classify as network errors
fn transport_error(path: &str, e: &reqwest::Error) -> color_eyre::Report {
  if e.is_timeout() {
    eyre!("Request timeout for {}: {}", path, e)
  } else if e.is_connect() {
    eyre!("Connection to TMDB failed for {}: {}", path, e)
  } else {
    eyre!("Network request for {} failed: {}", path, e)
  }
}

fn status_error(path: &str, status: StatusCode) -> color_eyre::Report {
  match status {
    StatusCode::NOT_FOUND => eyre!("TMDB resource {} not found", path),
    s if s.is_server_error() => eyre!("TMDB server error for {}: status {}", path, s.as_u16()),
    s => eyre!("TMDB server rejected {}: status {}", path, s.as_u16()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::MovieError;

  fn client() -> TmdbClient {
    TmdbClient::with_token(&TmdbConfig::default(), Some("token".to_string())).unwrap()
  }

  #[test]
  fn test_endpoint_with_query() {
    let url = client()
      .endpoint("/search/movie", &[("query", "blade runner")])
      .unwrap();
    assert_eq!(
      url.as_str(),
      "https://api.themoviedb.org/3/search/movie?query=blade+runner"
    );
  }

  #[test]
  fn test_endpoint_without_query() {
    let url = client().endpoint("/movie/603", &[]).unwrap();
    assert_eq!(url.as_str(), "https://api.themoviedb.org/3/movie/603");
  }

  #[test]
  fn test_status_errors_classify() {
    let not_found = status_error("/movie/1", StatusCode::NOT_FOUND);
    assert!(matches!(
      MovieError::from_report(&not_found),
      MovieError::DataNotFound(_)
    ));

    let unavailable = status_error("/trending/movie/day", StatusCode::SERVICE_UNAVAILABLE);
    assert!(matches!(
      MovieError::from_report(&unavailable),
      MovieError::Server(_)
    ));

    let unauthorized = status_error("/trending/movie/day", StatusCode::UNAUTHORIZED);
    assert!(matches!(
      MovieError::from_report(&unauthorized),
      MovieError::Server(_)
    ));
  }

  #[tokio::test]
  async fn test_missing_token_fails_without_request() {
    let config = TmdbConfig {
      base_url: "http://127.0.0.1:1".to_string(),
      ..TmdbConfig::default()
    };
    let client = TmdbClient::with_token(&config, None).unwrap();

    let report = client.fetch_trending().await.unwrap_err();
    assert!(format!("{:#}", report).contains("no API token"));
    assert!(matches!(
      MovieError::from_report(&report),
      MovieError::Server(_)
    ));
  }
}
