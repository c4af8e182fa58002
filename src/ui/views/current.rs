use crate::api::cache::ReleaseQueryKey;
use crate::api::requests::CurrentReleasesParams;
use crate::api::types::ReleaseListResponse;
use crate::api::CachedClient;
use crate::format::format_month_year;
use crate::query::Query;
use crate::ui::components::{release_item, KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::model::{filter_releases, showing_summary};
use crate::ui::renderfns::{draw_empty, draw_error, draw_message};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::ReleaseDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use super::{highlight_style, query_block};

/// This month's releases, filterable by title, series or publisher
pub struct CurrentReleasesView {
  client: CachedClient,
  key: ReleaseQueryKey,
  query: Query<ReleaseListResponse>,
  list_state: ListState,
  filter: SearchInput,
}

impl CurrentReleasesView {
  pub fn new(client: CachedClient, params: CurrentReleasesParams) -> Self {
    let key = ReleaseQueryKey::Current(params.clone());
    let cached = client.peek::<ReleaseListResponse>(&key);

    let client_for_query = client.clone();
    let mut query = Query::new(move || {
      let client = client_for_query.clone();
      let params = params.clone();
      async move { client.current_releases(&params).await }
    })
    .with_initial_data(cached);

    query.fetch();

    Self {
      client,
      key,
      query,
      list_state: ListState::default(),
      filter: SearchInput::new("Search by title, series, or publisher..."),
    }
  }

  fn title(&self) -> String {
    let month = self
      .query
      .data()
      .and_then(|d| d.meta.month.as_deref())
      .map(format_month_year)
      .unwrap_or_else(|| "Current Month".to_string());
    format!("{month} Releases")
  }

  fn refresh(&mut self) {
    self.client.invalidate(&self.key);
    self.query.refetch();
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let block = query_block(&self.title(), &self.query);

    let Some(data) = self.query.data() else {
      if self.query.is_error() {
        draw_error(frame, area, block, "releases");
      } else {
        draw_message(frame, area, block, "Loading...", "", Color::White);
      }
      return;
    };

    let releases = filter_releases(&data.data, self.filter.query());
    ensure_valid_selection(&mut self.list_state, releases.len());

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(0)])
      .split(block.inner(area));
    frame.render_widget(block, area);

    let summary = Paragraph::new(showing_summary(releases.len(), data.meta.total))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(summary, chunks[0]);

    if releases.is_empty() {
      draw_empty(frame, chunks[1], Default::default());
      return;
    }

    let items: Vec<ListItem> = releases
      .iter()
      .map(|r| release_item(r, chunks[1].width))
      .collect();
    let list = List::new(items)
      .highlight_style(highlight_style())
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
  }

  // Key handling helpers for or_else chain pattern
  fn handle_filter(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.filter.handle_key(key) {
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::Event(SearchEvent::Changed(_)) | KeyResult::Event(SearchEvent::Submitted(_)) => {
        self.list_state.select(Some(0));
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
        let data = self.query.data()?;
        let idx = self.list_state.selected()?;
        let release = filter_releases(&data.data, self.filter.query())
          .get(idx)
          .map(|r| (*r).clone())?;
        Some(ViewAction::Push(Box::new(ReleaseDetailView::new(release))))
      }
      _ => None,
    }
  }
}

impl View for CurrentReleasesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_filter(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(3), Constraint::Min(0)])
      .split(area);

    self.filter.render(frame, chunks[0]);
    self.render_list(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    "Current".to_string()
  }

  fn is_typing(&self) -> bool {
    self.filter.is_active()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "filter").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("enter", "details").with_priority(40),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
