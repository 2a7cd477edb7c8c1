use super::input::{InputResult, TextInput};
use super::{draw_input_box, KeyResult};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Query text changed (every keystroke; empty string on cancel)
  Changed(String),
  /// Overlay closed, query stays applied
  Submitted,
}

/// Search box opened with `/`
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Close the overlay and drop the query
  pub fn clear(&mut self) {
    self.active = false;
    self.input.clear();
  }

  /// Handle a key event.
  /// Call this regardless of active state, it handles activation too.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        // Reopen with the current query so it can be edited
        self.active = true;
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Consumed => KeyResult::Event(SearchEvent::Changed(self.input.value())),
      // Swallow everything else while typing
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if self.active {
      draw_input_box(frame, area, "Search", "/", "movie title", &self.input, 0);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_inactive_ignores_keys() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('j'))), KeyResult::NotHandled);
    assert!(!search.is_active());
  }

  #[test]
  fn test_each_keystroke_reports_query() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('/'))), KeyResult::Handled);
    assert_eq!(
      search.handle_key(key(KeyCode::Char('u'))),
      KeyResult::Event(SearchEvent::Changed("u".to_string()))
    );
    assert_eq!(
      search.handle_key(key(KeyCode::Char('p'))),
      KeyResult::Event(SearchEvent::Changed("up".to_string()))
    );
  }

  #[test]
  fn test_submit_keeps_query() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')));
    search.handle_key(key(KeyCode::Char('x')));
    assert_eq!(
      search.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(SearchEvent::Submitted)
    );
    assert!(!search.is_active());

    // Reopening edits the kept query
    search.handle_key(key(KeyCode::Char('/')));
    assert_eq!(
      search.handle_key(key(KeyCode::Char('y'))),
      KeyResult::Event(SearchEvent::Changed("xy".to_string()))
    );
  }

  #[test]
  fn test_cancel_clears_query() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')));
    search.handle_key(key(KeyCode::Char('x')));
    assert_eq!(
      search.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(SearchEvent::Changed(String::new()))
    );

    search.handle_key(key(KeyCode::Char('/')));
    assert_eq!(
      search.handle_key(key(KeyCode::Char('y'))),
      KeyResult::Event(SearchEvent::Changed("y".to_string()))
    );
  }
}
