use crate::api::cache::ReleaseQueryKey;
use crate::api::requests::UpcomingReleasesParams;
use crate::api::types::{MangaRelease, UpcomingReleasesResponse};
use crate::api::CachedClient;
use crate::query::Query;
use crate::ui::components::release_item;
use crate::ui::ensure_valid_selection;
use crate::ui::model::{month_sections, upcoming_rows, UpcomingRow};
use crate::ui::renderfns::{draw_empty, draw_error, draw_message};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::ReleaseDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState};
use std::collections::HashSet;

use super::{highlight_style, query_block};

/// Upcoming releases in collapsible month sections
pub struct UpcomingReleasesView {
  client: CachedClient,
  key: ReleaseQueryKey,
  query: Query<UpcomingReleasesResponse>,
  collapsed: HashSet<String>,
  list_state: ListState,
}

enum Selected {
  Month(String),
  Release(MangaRelease),
}

impl UpcomingReleasesView {
  pub fn new(client: CachedClient, params: UpcomingReleasesParams) -> Self {
    let key = ReleaseQueryKey::Upcoming(params.clone());
    let cached = client.peek::<UpcomingReleasesResponse>(&key);

    let client_for_query = client.clone();
    let mut query = Query::new(move || {
      let client = client_for_query.clone();
      let params = params.clone();
      async move { client.upcoming_releases(&params).await }
    })
    .with_initial_data(cached);

    query.fetch();

    Self {
      client,
      key,
      query,
      collapsed: HashSet::new(),
      list_state: ListState::default(),
    }
  }

  fn selected(&self) -> Option<Selected> {
    let data = self.query.data()?;
    let idx = self.list_state.selected()?;
    let sections = month_sections(data);
    let rows = upcoming_rows(&sections, &self.collapsed);

    match rows.get(idx)? {
      UpcomingRow::Month { section, .. } => Some(Selected::Month(sections[*section].key.to_string())),
      UpcomingRow::Release(release) => Some(Selected::Release((*release).clone())),
    }
  }

  fn toggle(&mut self, month: String) {
    if !self.collapsed.remove(&month) {
      self.collapsed.insert(month);
    }
  }

  fn render_sections(&mut self, frame: &mut Frame, area: Rect) {
    let block = query_block("Upcoming Releases", &self.query);

    let Some(data) = self.query.data() else {
      if self.query.is_error() {
        draw_error(frame, area, block, "upcoming releases");
      } else {
        draw_message(frame, area, block, "Loading...", "", Color::White);
      }
      return;
    };

    let sections = month_sections(data);
    if sections.is_empty() {
      draw_empty(frame, area, block);
      return;
    }

    let rows = upcoming_rows(&sections, &self.collapsed);
    ensure_valid_selection(&mut self.list_state, rows.len());

    let width = block.inner(area).width;
    let items: Vec<ListItem> = rows
      .iter()
      .map(|row| match row {
        UpcomingRow::Month { section, expanded } => {
          let section = &sections[*section];
          let marker = if *expanded { "▾" } else { "▸" };
          ListItem::new(Line::from(vec![
            Span::styled(format!("{marker} "), Style::default().fg(Color::Magenta)),
            Span::styled(section.label.clone(), Style::default().fg(Color::Magenta).bold()),
            Span::styled(
              format!("  {}", section.count_label()),
              Style::default().fg(Color::DarkGray),
            ),
          ]))
        }
        UpcomingRow::Release(release) => release_item(release, width),
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(highlight_style())
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for UpcomingReleasesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.client.invalidate(&self.key);
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Enter | KeyCode::Char(' ') => match self.selected() {
        Some(Selected::Month(month)) => {
          self.toggle(month);
          ViewAction::None
        }
        Some(Selected::Release(release)) if key.code == KeyCode::Enter => {
          ViewAction::Push(Box::new(ReleaseDetailView::new(release)))
        }
        _ => ViewAction::None,
      },
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_sections(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Upcoming".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("space", "expand/collapse").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("enter", "details").with_priority(40),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
