use crate::config::SearchConfig;
use crate::render::{format_decimal, format_number_with_commas, truncate};
use crate::repository::MovieRepository;
use crate::state::{ListState as MovieListState, MovieListModel, UiState};
use crate::tmdb::types::Movie;
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::rating_color;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::MovieDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

/// Trending movies, or search results while a query is typed
pub struct MovieListView {
  repo: MovieRepository,
  model: MovieListModel,
  list_state: ListState,
  search: SearchInput,
}

impl MovieListView {
  pub fn new(repo: MovieRepository, search: &SearchConfig) -> Self {
    let model = MovieListModel::new(repo.clone(), search);
    Self {
      repo,
      model,
      list_state: ListState::default(),
      search: SearchInput::new(),
    }
  }

  fn show_trending(&mut self) {
    self.search.clear();
    self.model.clear_query();
    self.list_state.select(Some(0));
  }

  fn title(&self, state: &MovieListState) -> String {
    let what = if state.is_search_result {
      format!("Search \"{}\"", truncate(self.model.query().trim(), 30))
    } else {
      "Trending".to_string()
    };

    match state.state.data() {
      Some(movies) => format!(" {} ({}) ", what, movies.len()),
      None if state.state.is_error() => format!(" {} (error) ", what),
      None => format!(" {} (loading...) ", what),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.model.state();

    let block = Block::default()
      .title(self.title(&state))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let movies = match &state.state {
      UiState::Success(movies) if !movies.is_empty() => movies,
      other => {
        let (content, color) = match other {
          UiState::Loading => ("Loading movies...".to_string(), Color::DarkGray),
          UiState::Error(e) => (format!("{}\n\nPress 'r' to retry.", e), Color::Red),
          _ if state.is_search_result => ("No movies found.".to_string(), Color::DarkGray),
          _ => ("No trending movies.".to_string(), Color::DarkGray),
        };
        let paragraph = Paragraph::new(content)
          .block(block)
          .wrap(Wrap { trim: true })
          .style(Style::default().fg(color));
        frame.render_widget(paragraph, area);
        return;
      }
    };

    ensure_valid_selection(&mut self.list_state, movies.len());

    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
      .split(area);
    let (area, preview_area) = (chunks[0], chunks[1]);

    let selected = self.list_state.selected().and_then(|i| movies.get(i));
    if let Some(movie) = selected {
      render_preview(frame, preview_area, movie);
    }

    let title_width = area.width.saturating_sub(20) as usize;
    let items: Vec<ListItem> = movies.iter().map(|m| movie_item(m, title_width)).collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn selected_movie(&self) -> Option<Movie> {
    let idx = self.list_state.selected()?;
    self.model.state().state.data()?.get(idx).cloned()
  }
}

fn movie_item(movie: &Movie, title_width: usize) -> ListItem<'static> {
  let year = movie.year();
  ListItem::new(Line::from(vec![
    Span::styled(
      format!("{:>4}", format_decimal(movie.vote_average, 1)),
      Style::default().fg(rating_color(movie.vote_average)),
    ),
    Span::raw("  "),
    Span::styled(
      format!("{:<4}", if year.is_empty() { "----" } else { year }),
      Style::default().fg(Color::Cyan),
    ),
    Span::raw("  "),
    Span::raw(truncate(&movie.title, title_width)),
  ]))
}

fn render_preview(frame: &mut Frame, area: Rect, movie: &Movie) {
  let block = Block::default()
    .title(format!(" {} ", truncate(&movie.title, area.width.saturating_sub(4) as usize)))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));
  let mut lines = vec![
    Line::from(vec![
      label("Rating   "),
      Span::styled(
        format!(
          "{} ({} votes)",
          format_decimal(movie.vote_average, 1),
          format_number_with_commas(movie.vote_count)
        ),
        Style::default().fg(rating_color(movie.vote_average)),
      ),
    ]),
    Line::from(vec![label("Released "), Span::raw(movie.release_date.clone())]),
  ];
  if let Some(poster) = movie.poster_url() {
    lines.push(Line::from(vec![label("Poster   "), Span::raw(poster)]));
  }
  if let Some(backdrop) = movie.backdrop_url() {
    lines.push(Line::from(vec![label("Backdrop "), Span::raw(backdrop)]));
  }
  lines.push(Line::default());
  lines.push(Line::from(movie.overview.clone()));

  let paragraph = Paragraph::new(lines)
    .block(block)
    .wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}

impl View for MovieListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Let search component try to handle first
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.model.set_query(&query);
        self.list_state.select(Some(0));
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('g') | KeyCode::Home => self.list_state.select_first(),
      KeyCode::Char('G') | KeyCode::End => self.list_state.select_last(),
      KeyCode::Char('r') => {
        self.show_trending();
        self.model.refresh();
      }
      KeyCode::Enter => {
        if let Some(movie) = self.selected_movie() {
          return ViewAction::Push(Box::new(MovieDetailView::new(
            movie.id,
            movie.title,
            self.repo.clone(),
          )));
        }
      }
      KeyCode::Esc => self.show_trending(),
      KeyCode::Char('q') => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    let query = self.model.query();
    if query.trim().is_empty() {
      "Trending".to_string()
    } else {
      format!("Search [{}]", truncate(query.trim(), 20))
    }
  }

  fn handle_command(&mut self, command: &str) -> bool {
    match command {
      "trending" => self.show_trending(),
      "refresh" => {
        self.show_trending();
        self.model.refresh();
      }
      _ => return false,
    }
    true
  }

  fn is_capturing_input(&self) -> bool {
    self.search.is_active()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("/", "search").with_priority(20),
      Shortcut::new("r", "refresh").with_priority(30),
      Shortcut::new("enter", "details").with_priority(40),
      Shortcut::new("q", "quit").with_priority(50),
    ]
  }
}
