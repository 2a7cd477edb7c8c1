use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in an input component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Buffer or cursor changed
  Consumed,
  /// Enter pressed, here's the submitted value
  Submitted(String),
  Cancelled,
  /// Key not handled, pass to next handler
  NotHandled,
}

/// Single-line text buffer with a cursor.
///
/// The cursor counts characters, not bytes, so titles like "Amélie" edit
/// correctly.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  chars: Vec<char>,
  cursor: usize,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn value(&self) -> String {
    self.chars.iter().collect()
  }

  pub fn is_empty(&self) -> bool {
    self.chars.is_empty()
  }

  pub fn clear(&mut self) {
    self.chars.clear();
    self.cursor = 0;
  }

  /// Text before and after the cursor, for rendering
  pub fn split_at_cursor(&self) -> (String, String) {
    (
      self.chars[..self.cursor].iter().collect(),
      self.chars[self.cursor..].iter().collect(),
    )
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
      KeyCode::Esc => return InputResult::Cancelled,
      KeyCode::Enter => return InputResult::Submitted(self.value()),
      KeyCode::Backspace if self.cursor > 0 => {
        self.cursor -= 1;
        self.chars.remove(self.cursor);
      }
      KeyCode::Delete if self.cursor < self.chars.len() => {
        self.chars.remove(self.cursor);
      }
      KeyCode::Backspace | KeyCode::Delete => {}
      KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Right => self.cursor = (self.cursor + 1).min(self.chars.len()),
      KeyCode::Home => self.cursor = 0,
      KeyCode::End => self.cursor = self.chars.len(),
      KeyCode::Char('a') if ctrl => self.cursor = 0,
      KeyCode::Char('e') if ctrl => self.cursor = self.chars.len(),
      KeyCode::Char('u') if ctrl => {
        // Clear line before cursor
        self.chars.drain(..self.cursor);
        self.cursor = 0;
      }
      KeyCode::Char('w') if ctrl => {
        // Delete word before cursor
        let mut start = self.cursor;
        while start > 0 && self.chars[start - 1] == ' ' {
          start -= 1;
        }
        while start > 0 && self.chars[start - 1] != ' ' {
          start -= 1;
        }
        self.chars.drain(start..self.cursor);
        self.cursor = start;
      }
      KeyCode::Char(_) if ctrl => return InputResult::NotHandled,
      KeyCode::Char(c) => {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
      }
      _ => return InputResult::NotHandled,
    }

    InputResult::Consumed
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl_key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
  }

  fn typed(text: &str) -> TextInput {
    let mut input = TextInput::new();
    for c in text.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
    input
  }

  #[test]
  fn test_typing_and_submit() {
    let mut input = typed("heat");
    assert_eq!(input.value(), "heat");
    assert_eq!(
      input.handle_key(key(KeyCode::Enter)),
      InputResult::Submitted("heat".to_string())
    );
  }

  #[test]
  fn test_cancel() {
    let mut input = typed("x");
    assert_eq!(input.handle_key(key(KeyCode::Esc)), InputResult::Cancelled);
  }

  #[test]
  fn test_multibyte_editing() {
    let mut input = typed("Amélie");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "Amlie");
    assert_eq!(input.split_at_cursor(), ("Am".to_string(), "lie".to_string()));
  }

  #[test]
  fn test_backspace_at_start_is_noop() {
    let mut input = TextInput::new();
    assert_eq!(input.handle_key(key(KeyCode::Backspace)), InputResult::Consumed);
    assert!(input.is_empty());
  }

  #[test]
  fn test_ctrl_u_clear_before_cursor() {
    let mut input = typed("blade runner");
    for _ in 0..6 {
      input.handle_key(key(KeyCode::Left));
    }
    input.handle_key(ctrl_key(KeyCode::Char('u')));
    assert_eq!(input.value(), "runner");
  }

  #[test]
  fn test_ctrl_w_deletes_word() {
    let mut input = typed("the dark knight ");
    input.handle_key(ctrl_key(KeyCode::Char('w')));
    assert_eq!(input.value(), "the dark ");
  }

  #[test]
  fn test_unbound_ctrl_is_not_inserted() {
    let mut input = typed("a");
    assert_eq!(
      input.handle_key(ctrl_key(KeyCode::Char('x'))),
      InputResult::NotHandled
    );
    assert_eq!(input.value(), "a");
  }
}
