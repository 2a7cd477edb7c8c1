use super::input::{InputResult, TextInput};
use super::{draw_input_box, KeyResult};
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState};

const MAX_SUGGESTIONS: usize = 8;

/// Events emitted by command input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  /// Resolved command name, or the raw input when nothing matched
  Submitted(String),
  Cancelled,
}

/// Command input component with autocomplete
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  selected_suggestion: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  fn reset(&mut self) {
    self.input.clear();
    self.selected_suggestion = 0;
  }

  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.input.value())
  }

  /// Handle a key event.
  /// Call this regardless of active state, it handles activation too.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.active = true;
        self.reset();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    let count = self.suggestions().len();
    match key.code {
      KeyCode::Esc => {
        self.active = false;
        self.reset();
        KeyResult::Event(CommandEvent::Cancelled)
      }
      KeyCode::Enter => {
        self.active = false;
        let cmd = self.resolve_command();
        self.reset();
        KeyResult::Event(CommandEvent::Submitted(cmd))
      }
      KeyCode::Tab | KeyCode::Down => {
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + 1) % count;
        }
        KeyResult::Handled
      }
      KeyCode::BackTab | KeyCode::Up => {
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + count - 1) % count;
        }
        KeyResult::Handled
      }
      _ => {
        if self.input.handle_key(key) == InputResult::Consumed {
          self.selected_suggestion = 0;
        }
        KeyResult::Handled
      }
    }
  }

  /// The selected suggestion, else the trimmed input
  fn resolve_command(&self) -> String {
    match self.suggestions().get(self.selected_suggestion) {
      Some(cmd) => cmd.name.to_string(),
      None => self.input.value().trim().to_lowercase(),
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let shown = suggestions.len().min(MAX_SUGGESTIONS);
    let rest = draw_input_box(
      frame,
      area,
      "Command",
      ":",
      "tab to cycle",
      &self.input,
      shown as u16,
    );

    if shown == 0 || rest.height == 0 {
      return;
    }

    let items: Vec<ListItem> = suggestions
      .iter()
      .take(shown)
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<12}", cmd.name), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default();
    state.select(Some(self.selected_suggestion));
    frame.render_stateful_widget(list, rest, &mut state);
  }
}
