//! Serde-deserializable types matching TMDB API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;

use super::types::{
  Collection, Genre, Movie, MovieDetail, MoviePage, ProductionCompany, ProductionCountry,
  SpokenLanguage,
};

// ============================================================================
// List endpoints (trending, search)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiMovie {
  pub id: i64,
  pub title: String,
  #[serde(default)]
  pub overview: String,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
  #[serde(default)]
  pub release_date: String,
  #[serde(default)]
  pub vote_average: f64,
  #[serde(default)]
  pub vote_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ApiMoviePage {
  #[serde(default)]
  pub page: u32,
  #[serde(default)]
  pub results: Vec<ApiMovie>,
  #[serde(default)]
  pub total_pages: u32,
  #[serde(default)]
  pub total_results: u32,
}

// ============================================================================
// Movie detail endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiGenre {
  pub id: i64,
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiProductionCompany {
  pub id: i64,
  pub name: String,
  pub logo_path: Option<String>,
  #[serde(default)]
  pub origin_country: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiProductionCountry {
  #[serde(rename = "iso_3166_1")]
  pub iso: String,
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiSpokenLanguage {
  #[serde(default)]
  pub english_name: String,
  #[serde(rename = "iso_639_1")]
  pub iso: String,
  #[serde(default)]
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiCollection {
  pub id: i64,
  pub name: String,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMovieDetail {
  pub id: i64,
  pub title: String,
  #[serde(default)]
  pub overview: String,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
  #[serde(default)]
  pub release_date: String,
  #[serde(default)]
  pub vote_average: f64,
  #[serde(default)]
  pub vote_count: i64,
  pub runtime: Option<i64>,
  #[serde(default)]
  pub genres: Vec<ApiGenre>,
  pub homepage: Option<String>,
  #[serde(default)]
  pub budget: i64,
  #[serde(default)]
  pub revenue: i64,
  #[serde(default)]
  pub status: String,
  pub tagline: Option<String>,
  #[serde(default)]
  pub production_companies: Vec<ApiProductionCompany>,
  // TMDB sends null for these on some older titles
  #[serde(default, deserialize_with = "null_as_empty")]
  pub production_countries: Vec<ApiProductionCountry>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub spoken_languages: Vec<ApiSpokenLanguage>,
  pub imdb_id: Option<String>,
  pub original_title: Option<String>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub origin_country: Vec<String>,
  #[serde(default)]
  pub adult: Option<bool>,
  #[serde(default)]
  pub popularity: Option<f64>,
  #[serde(default)]
  pub video: Option<bool>,
  pub belongs_to_collection: Option<ApiCollection>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Deserialize<'de>,
{
  let v: Option<Vec<T>> = Option::deserialize(deserializer)?;
  Ok(v.unwrap_or_default())
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiMovie> for Movie {
  fn from(m: ApiMovie) -> Self {
    Movie {
      id: m.id,
      title: m.title,
      overview: m.overview,
      poster_path: m.poster_path,
      backdrop_path: m.backdrop_path,
      release_date: m.release_date,
      vote_average: m.vote_average,
      vote_count: m.vote_count,
    }
  }
}

impl From<ApiMoviePage> for MoviePage {
  fn from(p: ApiMoviePage) -> Self {
    MoviePage {
      page: p.page,
      results: p.results.into_iter().map(Movie::from).collect(),
      total_pages: p.total_pages,
      total_results: p.total_results,
    }
  }
}

impl From<ApiMovieDetail> for MovieDetail {
  fn from(d: ApiMovieDetail) -> Self {
    MovieDetail {
      id: d.id,
      title: d.title,
      overview: d.overview,
      poster_path: d.poster_path,
      backdrop_path: d.backdrop_path,
      release_date: d.release_date,
      vote_average: d.vote_average,
      vote_count: d.vote_count,
      runtime: d.runtime,
      genres: d
        .genres
        .into_iter()
        .map(|g| Genre {
          id: g.id,
          name: g.name,
        })
        .collect(),
      homepage: d.homepage.filter(|h| !h.is_empty()),
      budget: d.budget,
      revenue: d.revenue,
      status: d.status,
      tagline: d.tagline.filter(|t| !t.is_empty()),
      production_companies: d
        .production_companies
        .into_iter()
        .map(|c| ProductionCompany {
          id: c.id,
          name: c.name,
          logo_path: c.logo_path,
          origin_country: c.origin_country,
        })
        .collect(),
      production_countries: d
        .production_countries
        .into_iter()
        .map(|c| ProductionCountry {
          iso: c.iso,
          name: c.name,
        })
        .collect(),
      spoken_languages: d
        .spoken_languages
        .into_iter()
        .map(|l| SpokenLanguage {
          english_name: l.english_name,
          iso: l.iso,
          name: l.name,
        })
        .collect(),
      imdb_id: d.imdb_id,
      original_title: d.original_title,
      origin_country: d.origin_country,
      adult: d.adult.unwrap_or(false),
      popularity: d.popularity.unwrap_or(0.0),
      video: d.video.unwrap_or(false),
      belongs_to_collection: d.belongs_to_collection.map(|c| Collection {
        id: c.id,
        name: c.name,
        poster_path: c.poster_path,
        backdrop_path: c.backdrop_path,
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_page_with_missing_optional_fields() {
    let json = r#"{
      "page": 1,
      "results": [
        {"id": 7, "title": "Sparse", "poster_path": null, "unknown_field": true},
        {"id": 8, "title": "Full", "overview": "o", "poster_path": "/p.jpg",
         "backdrop_path": "/b.jpg", "release_date": "2024-05-01",
         "vote_average": 7.5, "vote_count": 12}
      ],
      "total_pages": 3,
      "total_results": 42
    }"#;

    let page: MoviePage = serde_json::from_str::<ApiMoviePage>(json).unwrap().into();

    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_results, 42);
    assert_eq!(page.results.len(), 2);

    let sparse = &page.results[0];
    assert_eq!(sparse.overview, "");
    assert_eq!(sparse.release_date, "");
    assert_eq!(sparse.vote_average, 0.0);
    assert_eq!(sparse.vote_count, 0);
    assert_eq!(sparse.poster_path, None);

    assert_eq!(page.results[1].poster_path.as_deref(), Some("/p.jpg"));
  }

  #[test]
  fn test_detail_defaults_and_nested() {
    let json = r#"{
      "id": 603,
      "title": "The Matrix",
      "overview": "Neo",
      "release_date": "1999-03-30",
      "vote_average": 8.2,
      "vote_count": 25000,
      "runtime": 136,
      "genres": [{"id": 28, "name": "Action"}],
      "homepage": "",
      "budget": 63000000,
      "revenue": 463517383,
      "status": "Released",
      "tagline": "Welcome to the Real World.",
      "production_companies": [{"id": 79, "name": "Village Roadshow", "logo_path": null, "origin_country": "US"}],
      "production_countries": null,
      "spoken_languages": [{"english_name": "English", "iso_639_1": "en", "name": "English"}],
      "imdb_id": "tt0133093",
      "belongs_to_collection": {"id": 2344, "name": "The Matrix Collection", "poster_path": null, "backdrop_path": null}
    }"#;

    let detail: MovieDetail = serde_json::from_str::<ApiMovieDetail>(json).unwrap().into();

    assert_eq!(detail.genres[0].name, "Action");
    assert_eq!(detail.homepage, None);
    assert!(detail.production_countries.is_empty());
    assert!(detail.origin_country.is_empty());
    assert_eq!(detail.spoken_languages[0].iso, "en");
    assert!(!detail.adult);
    assert!(!detail.video);
    assert_eq!(detail.popularity, 0.0);
    assert_eq!(
      detail.belongs_to_collection.map(|c| c.name).as_deref(),
      Some("The Matrix Collection")
    );
  }
}
