use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct Shortcut {
  pub key: &'static str,
  pub label: &'static str,
  /// Lower is shown first
  pub priority: u8,
}

impl Shortcut {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search overlay etc.) and return
/// actions for the App to execute. Data comes from the state models, which
/// load in the background; `render` reads whatever state they hold now.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Label for this view in the footer breadcrumb
  fn breadcrumb_label(&self) -> String;

  /// Run a `:` command addressed to this view; false if it doesn't apply
  fn handle_command(&mut self, _command: &str) -> bool {
    false
  }

  /// True while the view owns the keyboard (e.g. typing in an overlay)
  fn is_capturing_input(&self) -> bool {
    false
  }

  /// Keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("q", "back").with_priority(30),
    ]
  }
}
