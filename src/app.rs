use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::repository::MovieRepository;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::MovieListView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{info, warn};

/// Terminal browser state
pub struct App {
  /// Navigation stack, the movie list is always at index 0
  view_stack: Vec<Box<dyn View>>,

  command_input: CommandInput,

  /// One-line feedback shown in the footer until the next key
  status: Option<String>,

  config: Config,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config, repo: MovieRepository) -> Self {
    let root = MovieListView::new(repo, &config.search);
    Self {
      view_stack: vec![Box::new(root)],
      command_input: CommandInput::new(),
      status: None,
      config,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(100));
    info!("Browser started");

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Resize) | Some(Event::Tick) => {}
        None => break,
      }
    }

    info!("Browser closed");
    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }
    self.status = None;

    // An open command overlay takes every key; otherwise a view that is
    // typing (search) keeps ':' for itself
    let capturing = !self.command_input.is_active()
      && self
        .view_stack
        .last()
        .is_some_and(|view| view.is_capturing_input());

    if !capturing {
      match self.command_input.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    match cmd {
      "quit" => self.should_quit = true,
      "trending" | "refresh" => {
        // List commands always go to the root view
        self.view_stack.truncate(1);
        if let Some(root) = self.view_stack.first_mut() {
          root.handle_command(cmd);
        }
      }
      "" => {}
      other => {
        warn!(command = other, "Unknown command");
        self.status = Some(format!("Unknown command: {}", other));
      }
    }
  }

  // Accessors for UI rendering
  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn base_url(&self) -> &str {
    &self.config.tmdb.base_url
  }

  pub fn status_message(&self) -> Option<&str> {
    self.status.as_deref()
  }

  pub fn shortcuts(&self) -> Vec<Shortcut> {
    self
      .view_stack
      .last()
      .map(|view| view.shortcuts())
      .unwrap_or_default()
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}
