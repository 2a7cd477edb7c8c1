use crate::ui::view::Shortcut;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, API host and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, base_url: &str, shortcuts: &[Shortcut]) {
  let mut spans = vec![
    Span::styled(" movieshelf ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", extract_host(base_url)),
      Style::default().fg(Color::White),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
  ];

  let mut sorted: Vec<&Shortcut> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);
  for shortcut in sorted {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host part of the API base URL
fn extract_host(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_host() {
    assert_eq!(
      extract_host("https://api.themoviedb.org/3"),
      "api.themoviedb.org"
    );
    assert_eq!(extract_host("http://localhost:8080/3"), "localhost:8080");
    assert_eq!(extract_host("localhost"), "localhost");
  }
}
