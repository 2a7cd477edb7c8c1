//! Plain-text formatting shared by the terminal UI and CLI output.

use crate::tmdb::types::{Movie, MovieDetail};

/// Truncate to at most `max_len` characters, ending in "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// 1234567 -> "1,234,567"
pub fn format_number_with_commas(n: i64) -> String {
  let digits = n.unsigned_abs().to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
  if n < 0 {
    out.push('-');
  }
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}

/// Fixed number of decimal places, e.g. ratings and popularity
pub fn format_decimal(value: f64, places: usize) -> String {
  format!("{:.*}", places, value)
}

/// One list row: rating, year and title
pub fn movie_line(movie: &Movie, title_width: usize) -> String {
  let year = movie.year();
  format!(
    "{:>4}  {:<4}  {}",
    format_decimal(movie.vote_average, 1),
    if year.is_empty() { "----" } else { year },
    truncate(&movie.title, title_width)
  )
}

/// Labelled fields of the detail screen, in display order.
///
/// Fields with no value are left out.
pub fn detail_fields(detail: &MovieDetail) -> Vec<(&'static str, String)> {
  let mut fields = Vec::new();

  if !detail.release_date.is_empty() {
    fields.push(("Released", detail.release_date.clone()));
  }
  fields.push((
    "Rating",
    format!(
      "{}/10 ({} votes)",
      format_decimal(detail.vote_average, 1),
      format_number_with_commas(detail.vote_count)
    ),
  ));
  if !detail.genres.is_empty() {
    let genres: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
    fields.push(("Genres", genres.join(", ")));
  }
  if let Some(runtime) = detail.formatted_runtime() {
    fields.push(("Runtime", runtime));
  }
  if !detail.status.is_empty() {
    fields.push(("Status", detail.status.clone()));
  }
  if let Some(original) = detail.original_title.as_ref().filter(|t| **t != detail.title) {
    fields.push(("Original Title", original.clone()));
  }
  if !detail.spoken_languages.is_empty() {
    let languages: Vec<&str> = detail
      .spoken_languages
      .iter()
      .map(|l| l.english_name.as_str())
      .collect();
    fields.push(("Languages", languages.join(", ")));
  }
  if !detail.production_countries.is_empty() {
    let countries: Vec<&str> = detail
      .production_countries
      .iter()
      .map(|c| c.name.as_str())
      .collect();
    fields.push(("Countries", countries.join(", ")));
  }
  if let Some(collection) = &detail.belongs_to_collection {
    fields.push(("Collection", collection.name.clone()));
  }
  fields.push(("Popularity", format_decimal(detail.popularity, 1)));
  if detail.budget > 0 {
    fields.push(("Budget", format!("${}", format_number_with_commas(detail.budget))));
  }
  if detail.revenue > 0 {
    fields.push(("Revenue", format!("${}", format_number_with_commas(detail.revenue))));
  }
  if !detail.production_companies.is_empty() {
    let companies: Vec<&str> = detail
      .production_companies
      .iter()
      .map(|c| c.name.as_str())
      .collect();
    fields.push(("Companies", companies.join(", ")));
  }
  if let Some(homepage) = &detail.homepage {
    fields.push(("Homepage", homepage.clone()));
  }
  if let Some(imdb_id) = &detail.imdb_id {
    fields.push(("IMDb", format!("https://www.imdb.com/title/{}", imdb_id)));
  }
  if let Some(poster) = detail.poster_url() {
    fields.push(("Poster", poster));
  }
  if let Some(backdrop) = detail.backdrop_url() {
    fields.push(("Backdrop", backdrop));
  }

  fields
}

/// Full detail record as plain text
pub fn detail_text(detail: &MovieDetail) -> String {
  let mut out = String::new();

  out.push_str(&detail.title);
  if !detail.year().is_empty() {
    out.push_str(&format!(" ({})", detail.year()));
  }
  out.push('\n');
  if let Some(tagline) = &detail.tagline {
    out.push_str(&format!("\"{}\"\n", tagline));
  }
  out.push('\n');

  let width = detail_fields(detail)
    .iter()
    .map(|(label, _)| label.len())
    .max()
    .unwrap_or(0);
  for (label, value) in detail_fields(detail) {
    out.push_str(&format!("{:<width$}  {}\n", label, value, width = width));
  }

  if !detail.overview.is_empty() {
    out.push('\n');
    out.push_str(&detail.overview);
    out.push('\n');
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{detail, movie};
  use crate::tmdb::types::Genre;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_counts_chars() {
    assert_eq!(truncate("Amélie Poulain", 9), "Amélie...");
  }

  #[test]
  fn test_format_number_with_commas() {
    assert_eq!(format_number_with_commas(0), "0");
    assert_eq!(format_number_with_commas(999), "999");
    assert_eq!(format_number_with_commas(1000), "1,000");
    assert_eq!(format_number_with_commas(356_000_000), "356,000,000");
    assert_eq!(format_number_with_commas(-100), "-100");
    assert_eq!(format_number_with_commas(-1_234_567), "-1,234,567");
  }

  #[test]
  fn test_format_decimal() {
    assert_eq!(format_decimal(7.456, 1), "7.5");
    assert_eq!(format_decimal(8.0, 1), "8.0");
    assert_eq!(format_decimal(123.4567, 2), "123.46");
  }

  #[test]
  fn test_movie_line() {
    let line = movie_line(&movie(1, "Heat"), 40);
    assert_eq!(line, " 8.5  2023  Heat");

    let mut undated = movie(2, "Untitled");
    undated.release_date.clear();
    assert!(movie_line(&undated, 40).contains("----"));
  }

  #[test]
  fn test_detail_fields_skip_empty_values() {
    let mut d = detail(1, "Heat");
    d.genres = vec![
      Genre {
        id: 80,
        name: "Crime".to_string(),
      },
      Genre {
        id: 18,
        name: "Drama".to_string(),
      },
    ];
    d.original_title = Some("Heat".to_string());
    d.revenue = 0;

    let fields = detail_fields(&d);
    let get = |label: &str| fields.iter().find(|(l, _)| *l == label).map(|(_, v)| v.as_str());

    assert_eq!(get("Genres"), Some("Crime, Drama"));
    assert_eq!(get("Runtime"), Some("2h 0m"));
    assert_eq!(get("Budget"), Some("$1,000,000"));
    assert_eq!(get("Rating"), Some("8.5/10 (1,000 votes)"));
    assert_eq!(get("Revenue"), None);
    assert_eq!(get("Original Title"), None);
    assert_eq!(get("Homepage"), None);
    assert_eq!(get("Poster"), Some("https://image.tmdb.org/t/p/w500/test.jpg"));
  }

  #[test]
  fn test_detail_text() {
    let mut d = detail(1, "Heat");
    d.tagline = Some("A Los Angeles crime saga".to_string());

    let text = detail_text(&d);
    assert!(text.starts_with("Heat (2023)\n\"A Los Angeles crime saga\"\n"));
    assert!(text.contains("Status"));
    assert!(text.trim_end().ends_with("Test overview"));
  }
}
