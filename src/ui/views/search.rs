use crate::api::cache::ReleaseQueryKey;
use crate::api::requests::SearchParams;
use crate::api::types::ReleaseListResponse;
use crate::api::CachedClient;
use crate::query::Query;
use crate::ui::components::{release_item, KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::model::search_summary;
use crate::ui::renderfns::{draw_empty, draw_error, draw_message};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::ReleaseDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use super::{highlight_style, query_block};

/// Server-side search across all releases.
///
/// The query only runs once a non-empty term has been submitted.
pub struct SearchView {
  client: CachedClient,
  term: String,
  query: Query<ReleaseListResponse>,
  list_state: ListState,
  input: SearchInput,
}

impl SearchView {
  pub fn new(client: CachedClient) -> Self {
    let mut input = SearchInput::new("Search by title, series, or author...");
    input.activate();

    Self {
      query: search_query(&client, ""),
      client,
      term: String::new(),
      list_state: ListState::default(),
      input,
    }
  }

  fn set_term(&mut self, term: String) {
    if term == self.term {
      return;
    }
    self.query = search_query(&self.client, &term);
    self.query.fetch();
    self.term = term;
    self.list_state.select(Some(0));
  }

  fn refresh(&mut self) {
    if self.term.is_empty() {
      return;
    }
    self
      .client
      .invalidate(&ReleaseQueryKey::Search(SearchParams::new(self.term.clone())));
    self.query.refetch();
  }

  fn render_results(&mut self, frame: &mut Frame, area: Rect) {
    let block = query_block("Results", &self.query);

    if !self.query.is_enabled() {
      draw_message(
        frame,
        area,
        block,
        "Start searching",
        "Enter a manga title, series name, or author to find releases",
        Color::White,
      );
      return;
    }

    let Some(data) = self.query.data() else {
      if self.query.is_error() {
        draw_error(frame, area, block, "search results");
      } else {
        draw_message(frame, area, block, "Searching...", "", Color::White);
      }
      return;
    };

    ensure_valid_selection(&mut self.list_state, data.data.len());

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(0)])
      .split(block.inner(area));
    frame.render_widget(block, area);

    let summary = Paragraph::new(search_summary(data.meta.total, &self.term))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(summary, chunks[0]);

    if data.data.is_empty() {
      draw_empty(frame, chunks[1], Default::default());
      return;
    }

    let items: Vec<ListItem> = data
      .data
      .iter()
      .map(|r| release_item(r, chunks[1].width))
      .collect();
    let list = List::new(items)
      .highlight_style(highlight_style())
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
  }

  fn handle_input(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.input.handle_key(key) {
      KeyResult::Handled | KeyResult::Event(SearchEvent::Changed(_)) => {
        // Esc clears the term and leaves the bar
        if !self.input.is_active() {
          self.set_term(String::new());
        }
        Some(ViewAction::None)
      }
      KeyResult::Event(SearchEvent::Submitted(term)) => {
        self.set_term(term);
        Some(ViewAction::None)
      }
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        Some(ViewAction::None)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        Some(ViewAction::None)
      }
      _ => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('r') => {
        self.refresh();
        Some(ViewAction::None)
      }
      KeyCode::Enter => {
        let idx = self.list_state.selected()?;
        let release = self.query.data()?.data.get(idx)?.clone();
        Some(ViewAction::Push(Box::new(ReleaseDetailView::new(release))))
      }
      _ => None,
    }
  }
}

/// Query for `term`; disabled when the term is empty.
fn search_query(client: &CachedClient, term: &str) -> Query<ReleaseListResponse> {
  let params = SearchParams::new(term);
  let enabled = !params.q.is_empty();
  let cached = if enabled {
    client.peek::<ReleaseListResponse>(&ReleaseQueryKey::Search(params.clone()))
  } else {
    None
  };

  let client = client.clone();
  Query::new(move || {
    let client = client.clone();
    let params = params.clone();
    async move {
      // The client answers `None` only for an empty term, which a disabled
      // query never sends
      client
        .search_releases(&params)
        .await
        .map(Option::unwrap_or_default)
    }
  })
  .enabled(enabled)
  .with_initial_data(cached)
}

impl View for SearchView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_input(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(3), Constraint::Min(0)])
      .split(area);

    self.input.render(frame, chunks[0]);
    self.render_results(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    if self.term.is_empty() {
      "Search".to_string()
    } else {
      format!("Search [{}]", self.term)
    }
  }

  fn is_typing(&self) -> bool {
    self.input.is_active()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("enter", "details").with_priority(40),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
