use crate::render::{detail_fields, truncate};
use crate::repository::MovieRepository;
use crate::state::{MovieDetailModel, UiState};
use crate::tmdb::types::MovieDetail;
use crate::ui::renderfns::{rating_color, status_color};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// View for displaying one movie's details
pub struct MovieDetailView {
  id: i64,
  title: String,
  model: MovieDetailModel,
  scroll: u16,
}

impl MovieDetailView {
  pub fn new(id: i64, title: String, repo: MovieRepository) -> Self {
    let mut model = MovieDetailModel::new(repo);
    model.load(id, false);

    Self {
      id,
      title,
      model,
      scroll: 0,
    }
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let state = self.model.state();

    let title = match &state {
      UiState::Loading => format!(" {} (loading...) ", self.title),
      UiState::Error(_) => format!(" {} (error) ", self.title),
      UiState::Success(detail) => format!(" {} ", detail.title),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.is_loading() {
      let paragraph =
        Paragraph::new("Loading movie details...").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, inner);
      return;
    }

    if let Some(error) = state.error() {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, inner);
      return;
    }

    let detail = match state.data() {
      Some(detail) => detail,
      None => return,
    };

    let paragraph = Paragraph::new(detail_lines(detail, inner.width))
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, inner);
  }
}

fn detail_lines(detail: &MovieDetail, width: u16) -> Vec<Line<'static>> {
  let mut lines = Vec::new();

  let mut heading = vec![Span::styled(
    detail.title.clone(),
    Style::default().fg(Color::White).bold(),
  )];
  if !detail.year().is_empty() {
    heading.push(Span::styled(
      format!(" ({})", detail.year()),
      Style::default().fg(Color::DarkGray),
    ));
  }
  lines.push(Line::from(heading));

  if let Some(tagline) = &detail.tagline {
    lines.push(Line::from(Span::styled(
      tagline.clone(),
      Style::default().fg(Color::DarkGray).italic(),
    )));
  }
  lines.push(Line::default());

  let label_width = 15;
  let value_width = (width as usize).saturating_sub(label_width + 1).max(10);
  for (label, value) in detail_fields(detail) {
    let value_style = match label {
      "Rating" => Style::default().fg(rating_color(detail.vote_average)),
      "Status" => Style::default().fg(status_color(&detail.status)),
      _ => Style::default(),
    };
    lines.push(Line::from(vec![
      Span::styled(
        format!("{:<width$}", label, width = label_width),
        Style::default().fg(Color::DarkGray),
      ),
      Span::styled(truncate(&value, value_width), value_style),
    ]));
  }

  if !detail.overview.is_empty() {
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
      "Overview",
      Style::default().fg(Color::Cyan).bold(),
    )));
    lines.push(Line::from(detail.overview.clone()));
  }

  lines
}

impl View for MovieDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.scroll = 0;
        self.model.load(self.id, true);
      }
      KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
      KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    truncate(&self.title, 30)
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("j/k", "scroll").with_priority(20),
      Shortcut::new("r", "refresh").with_priority(30),
      Shortcut::new("q", "back").with_priority(40),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::detail;

  fn text(lines: &[Line]) -> Vec<String> {
    lines
      .iter()
      .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
      .collect()
  }

  #[test]
  fn test_detail_lines_layout() {
    let mut d = detail(1, "Heat");
    d.tagline = Some("A Los Angeles crime saga".to_string());

    let lines = text(&detail_lines(&d, 80));
    assert_eq!(lines[0], "Heat (2023)");
    assert_eq!(lines[1], "A Los Angeles crime saga");
    assert!(lines.iter().any(|l| l.starts_with("Status") && l.ends_with("Released")));
    assert_eq!(lines.last().map(String::as_str), Some("Test overview"));
  }

  #[test]
  fn test_detail_lines_without_optional_parts() {
    let mut d = detail(2, "Untitled");
    d.release_date.clear();
    d.overview.clear();

    let lines = text(&detail_lines(&d, 80));
    assert_eq!(lines[0], "Untitled");
    assert!(!lines.iter().any(|l| l == "Overview"));
  }
}
