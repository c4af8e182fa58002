use crate::api::types::MangaRelease;
use crate::format::{format_date, format_price, Currency};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Every field of one release
pub struct ReleaseDetailView {
  release: MangaRelease,
  scroll: u16,
}

impl ReleaseDetailView {
  pub fn new(release: MangaRelease) -> Self {
    Self { release, scroll: 0 }
  }

  fn lines(&self) -> Vec<Line<'static>> {
    let r = &self.release;
    let mut lines = vec![
      Line::styled(r.title.clone(), Style::default().fg(Color::White).bold()),
      Line::raw(""),
    ];

    let mut field = |label: &str, value: String| {
      lines.push(Line::from(vec![
        Span::styled(format!("{label:<14}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
      ]));
    };

    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let joined = |v: &[String]| {
      if v.is_empty() {
        "-".to_string()
      } else {
        v.join(", ")
      }
    };

    field("Series", or_dash(&r.series_name));
    field("Volume", or_dash(&r.volume_number));
    field("Publisher", r.publisher.name.clone());
    field("Release date", format_date(r.release_date));
    field("Format", or_dash(&r.format));
    field(
      "Pages",
      r.page_count
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string()),
    );
    field("Price (USD)", format_price(r.price_usd, Currency::Usd));
    field("Price (GBP)", format_price(r.price_gbp, Currency::Gbp));
    field("ISBN-13", or_dash(&r.isbn_13));
    field("ISBN-10", or_dash(&r.isbn_10));
    field("Demographic", or_dash(&r.demographic));
    field("Genres", joined(&r.genres));
    field("Authors", joined(&r.authors));
    field("Illustrators", joined(&r.illustrators));
    field("Regions", joined(&r.regions));

    if let Some(description) = &r.description {
      lines.push(Line::raw(""));
      lines.push(Line::raw(description.clone()));
    }

    lines
  }
}

impl View for ReleaseDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.scroll = self.scroll.saturating_add(1);
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.scroll = self.scroll.saturating_sub(1);
        ViewAction::None
      }
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Release ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let paragraph = Paragraph::new(self.lines())
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    crate::ui::renderfns::truncate(&self.release.title, 32)
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("j/k", "scroll").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
