use crate::api::requests::{CurrentReleasesParams, UpcomingReleasesParams};
use crate::api::CachedClient;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{CurrentReleasesView, SearchView, UpcomingReleasesView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Main application state
pub struct App {
  /// Navigation stack; root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// `:` command palette
  command: CommandInput,

  client: CachedClient,

  config: Config,

  /// One-line message shown in the footer until the next key
  status: Option<String>,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config, client: CachedClient) -> Self {
    let root = Box::new(CurrentReleasesView::new(
      client.clone(),
      current_params(&config),
    ));

    Self {
      view_stack: vec![root],
      command: CommandInput::new(),
      client,
      config,
      status: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    Ok(())
  }

  fn tick(&mut self) {
    // Views underneath keep polling so their results don't pile up
    for view in self.view_stack.iter_mut() {
      view.tick();
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    self.status = None;

    // ':' belongs to the view's input while it has focus
    let typing = self.current_view().is_some_and(|v| v.is_typing());
    if self.command.is_active() || !typing {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    if !typing {
      match key.code {
        KeyCode::Char('q') => {
          self.go_back(true);
          return;
        }
        KeyCode::Esc => {
          self.go_back(false);
          return;
        }
        _ => {}
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
      ViewAction::Push(view) => {
        debug!(view = %view.breadcrumb_label(), "push view");
        self.view_stack.push(view);
      }
    }
  }

  fn go_back(&mut self, quit_at_root: bool) {
    if self.view_stack.len() > 1 {
      self.view_stack.pop();
    } else if quit_at_root {
      self.should_quit = true;
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    let root: Box<dyn View> = match cmd {
      "current" => Box::new(CurrentReleasesView::new(
        self.client.clone(),
        current_params(&self.config),
      )),
      "upcoming" => Box::new(UpcomingReleasesView::new(
        self.client.clone(),
        upcoming_params(&self.config),
      )),
      "search" => Box::new(SearchView::new(self.client.clone())),
      "quit" => {
        self.should_quit = true;
        return;
      }
      other => {
        self.status = Some(format!("Unknown command: {other}"));
        return;
      }
    };

    info!(command = cmd, "switch root view");
    self.view_stack.clear();
    self.view_stack.push(root);
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command
  }

  pub fn api_url(&self) -> &str {
    self.client.base_url()
  }

  pub fn status(&self) -> Option<&str> {
    self.status.as_deref()
  }

  #[cfg(test)]
  pub fn should_quit(&self) -> bool {
    self.should_quit
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}

fn current_params(config: &Config) -> CurrentReleasesParams {
  CurrentReleasesParams {
    publisher: config.views.publisher.clone(),
    region: config.views.region.clone(),
    sort: config.views.sort,
    ..Default::default()
  }
}

fn upcoming_params(config: &Config) -> UpcomingReleasesParams {
  UpcomingReleasesParams {
    months: Some(config.views.upcoming_months),
    publisher: config.views.publisher.clone(),
    region: config.views.region.clone(),
    ..Default::default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::client::client_for;
  use crate::api::test_server::unreachable_base_url;
  use crate::api::types::SortOrder;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn app() -> App {
    let client = CachedClient::new(client_for(&unreachable_base_url().await));
    App::new(Config::default(), client)
  }

  fn run_command(app: &mut App, text: &str) {
    app.handle_key(key(KeyCode::Char(':')));
    for c in text.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
  }

  #[tokio::test]
  async fn test_starts_on_current_view() {
    let app = app().await;
    assert_eq!(app.view_breadcrumb(), vec!["Current"]);
  }

  #[tokio::test]
  async fn test_command_replaces_root() {
    let mut app = app().await;
    run_command(&mut app, "upcoming");
    assert_eq!(app.view_breadcrumb(), vec!["Upcoming"]);

    run_command(&mut app, "s");
    assert_eq!(app.view_breadcrumb(), vec!["Search"]);
    assert!(!app.should_quit());
  }

  #[tokio::test]
  async fn test_unknown_command_sets_status() {
    let mut app = app().await;
    run_command(&mut app, "zzz");
    assert_eq!(app.status(), Some("Unknown command: zzz"));
    assert_eq!(app.view_breadcrumb(), vec!["Current"]);
  }

  #[tokio::test]
  async fn test_q_at_root_quits() {
    let mut app = app().await;
    app.handle_key(key(KeyCode::Esc));
    assert!(!app.should_quit());
    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit());
  }

  #[tokio::test]
  async fn test_typing_view_gets_q() {
    let mut app = app().await;
    run_command(&mut app, "search");
    // Search opens with the input focused
    app.handle_key(key(KeyCode::Char('q')));
    assert!(!app.should_quit());
  }

  #[tokio::test]
  async fn test_colon_in_search_term_stays_in_input() {
    let mut app = app().await;
    run_command(&mut app, "search");

    for c in "re:zero".chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    assert!(!app.command_input().is_active());
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.status(), None);
    assert_eq!(app.view_breadcrumb(), vec!["Search [re:zero]"]);
  }

  #[tokio::test]
  async fn test_colon_opens_palette_once_input_is_left() {
    let mut app = app().await;
    app.handle_key(key(KeyCode::Char('/')));
    app.handle_key(key(KeyCode::Char(':')));
    assert!(!app.command_input().is_active());

    app.handle_key(key(KeyCode::Esc));
    app.handle_key(key(KeyCode::Char(':')));
    assert!(app.command_input().is_active());
  }

  #[test]
  fn test_view_config_reaches_params() {
    let mut config = Config::default();
    config.views.region = Some("uk".to_string());
    config.views.sort = Some(SortOrder::Title);
    let current = current_params(&config);
    assert_eq!(current.region.as_deref(), Some("uk"));
    assert_eq!(current.sort, Some(SortOrder::Title));
    assert_eq!(upcoming_params(&config).months, Some(3));
  }

  #[tokio::test]
  async fn test_quit_command() {
    let mut app = app().await;
    run_command(&mut app, "quit");
    assert!(app.should_quit());
  }
}
