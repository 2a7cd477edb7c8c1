mod command_input;
mod input;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
use input::TextInput;
pub use search_input::{SearchEvent, SearchInput};

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Generic result type for component key handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, no event for parent to handle
  Handled,
  /// Key was consumed, here's an event for parent to process
  Event(T),
  /// Key was not consumed, parent should try next handler
  NotHandled,
}

/// Bordered input box pinned to the top-left of `area`.
///
/// Returns the area left below the input line for extra rows (suggestions).
fn draw_input_box(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  prefix: &str,
  placeholder: &str,
  input: &TextInput,
  extra_rows: u16,
) -> Rect {
  let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
  let height = (3 + extra_rows).min(area.height);
  let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height).intersection(area);

  frame.render_widget(Clear, overlay_area);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(format!(" {} ", title));
  let inner = block.inner(overlay_area);
  frame.render_widget(block, overlay_area);

  if inner.height == 0 {
    return inner;
  }

  let (before, after) = input.split_at_cursor();
  let mut spans = vec![
    Span::styled(prefix.to_string(), Style::default().fg(Color::Yellow)),
    Span::raw(before),
    Span::styled("_", Style::default().fg(Color::Yellow)),
    Span::raw(after),
  ];
  if input.is_empty() {
    spans.push(Span::styled(
      format!(" {}", placeholder),
      Style::default().fg(Color::DarkGray),
    ));
  }
  let line = Line::from(spans);
  frame.render_widget(Paragraph::new(line), Rect { height: 1, ..inner });

  Rect {
    y: inner.y + 1,
    height: inner.height - 1,
    ..inner
  }
}
