pub mod components;
mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current view
      Constraint::Length(1), // Footer breadcrumb
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], app.base_url(), &app.shortcuts());

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }
  app.command_input().render_overlay(frame, chunks[1]);

  renderfns::draw_footer(frame, chunks[2], &app.breadcrumb(), app.status_message());
}

/// Keep the selection inside a list of `len` items
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}
