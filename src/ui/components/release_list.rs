use crate::api::types::MangaRelease;
use crate::format::{format_date, format_price, Currency};
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::ListItem;

const MAX_GENRES: usize = 3;

/// Two-line card for one release: title, then publisher, date, price and
/// up to three genres.
pub fn release_item(release: &MangaRelease, width: u16) -> ListItem<'static> {
  let title = Line::from(Span::styled(
    truncate(&release.title, width.saturating_sub(4) as usize),
    Style::default().fg(Color::White).bold(),
  ));

  let mut details = vec![
    Span::raw("  "),
    Span::styled(
      release.publisher.name.clone(),
      Style::default().fg(Color::Magenta),
    ),
    Span::styled(" · ", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format_date(release.release_date),
      Style::default().fg(Color::Cyan),
    ),
  ];

  if release.price_usd.is_some() {
    details.push(Span::styled(" · ", Style::default().fg(Color::DarkGray)));
    details.push(Span::styled(
      format_price(release.price_usd, Currency::Usd),
      Style::default().fg(Color::Green),
    ));
  }

  if !release.genres.is_empty() {
    let genres = release
      .genres
      .iter()
      .take(MAX_GENRES)
      .map(String::as_str)
      .collect::<Vec<_>>()
      .join(", ");
    details.push(Span::styled(" · ", Style::default().fg(Color::DarkGray)));
    details.push(Span::styled(genres, Style::default().fg(Color::DarkGray)));
  }

  ListItem::new(Text::from(vec![title, Line::from(details)]))
}
