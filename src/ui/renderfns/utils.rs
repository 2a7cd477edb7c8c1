use ratatui::prelude::Color;

/// Display color for a TMDB vote average (0-10)
pub fn rating_color(vote_average: f64) -> Color {
  if vote_average >= 7.5 {
    Color::Green
  } else if vote_average >= 6.0 {
    Color::Yellow
  } else if vote_average > 0.0 {
    Color::Red
  } else {
    // Unrated
    Color::DarkGray
  }
}

/// Display color for a TMDB release status
pub fn status_color(status: &str) -> Color {
  match status {
    "Released" => Color::Green,
    "Post Production" | "In Production" => Color::Yellow,
    "Canceled" => Color::Red,
    _ => Color::White,
  }
}
