use serde::{Deserialize, Serialize};

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const BACKDROP_BASE_URL: &str = "https://image.tmdb.org/t/p/w780";

/// Movie summary for list views (trending, search results)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
  pub id: i64,
  pub title: String,
  pub overview: String,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
  pub release_date: String, // YYYY-MM-DD, may be empty
  pub vote_average: f64,
  pub vote_count: i64,
}

impl Movie {
  pub fn year(&self) -> &str {
    release_year(&self.release_date)
  }

  pub fn poster_url(&self) -> Option<String> {
    image_url(POSTER_BASE_URL, self.poster_path.as_deref())
  }

  pub fn backdrop_url(&self) -> Option<String> {
    image_url(BACKDROP_BASE_URL, self.backdrop_path.as_deref())
  }
}

/// Full movie details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
  pub id: i64,
  pub title: String,
  pub overview: String,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
  pub release_date: String,
  pub vote_average: f64,
  pub vote_count: i64,
  pub runtime: Option<i64>, // minutes
  pub genres: Vec<Genre>,
  pub homepage: Option<String>,
  pub budget: i64,
  pub revenue: i64,
  pub status: String, // "Released", "In Production", ...
  pub tagline: Option<String>,
  pub production_companies: Vec<ProductionCompany>,
  pub production_countries: Vec<ProductionCountry>,
  pub spoken_languages: Vec<SpokenLanguage>,
  pub imdb_id: Option<String>,
  pub original_title: Option<String>,
  pub origin_country: Vec<String>,
  pub adult: bool,
  pub popularity: f64,
  pub video: bool,
  pub belongs_to_collection: Option<Collection>,
}

impl MovieDetail {
  pub fn year(&self) -> &str {
    release_year(&self.release_date)
  }

  pub fn poster_url(&self) -> Option<String> {
    image_url(POSTER_BASE_URL, self.poster_path.as_deref())
  }

  pub fn backdrop_url(&self) -> Option<String> {
    image_url(BACKDROP_BASE_URL, self.backdrop_path.as_deref())
  }

  /// Runtime as "Xh Ym", or None when TMDB has no runtime
  pub fn formatted_runtime(&self) -> Option<String> {
    self
      .runtime
      .map(|minutes| format!("{}h {}m", minutes / 60, minutes % 60))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
  pub id: i64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompany {
  pub id: i64,
  pub name: String,
  pub logo_path: Option<String>,
  pub origin_country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCountry {
  pub iso: String, // ISO 3166-1
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenLanguage {
  pub english_name: String,
  pub iso: String, // ISO 639-1
  pub name: String,
}

/// Collection (series) a movie belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
  pub id: i64,
  pub name: String,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
}

/// One page of movie results
#[derive(Debug, Clone, PartialEq)]
pub struct MoviePage {
  pub page: u32,
  pub results: Vec<Movie>,
  pub total_pages: u32,
  pub total_results: u32,
}

fn release_year(release_date: &str) -> &str {
  release_date.split('-').next().unwrap_or("")
}

fn image_url(base: &str, path: Option<&str>) -> Option<String> {
  path.map(|p| format!("{}{}", base, p))
}
