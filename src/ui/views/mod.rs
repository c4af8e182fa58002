mod current;
mod release_detail;
mod search;
mod upcoming;

pub use current::CurrentReleasesView;
pub use release_detail::ReleaseDetailView;
pub use search::SearchView;
pub use upcoming::UpcomingReleasesView;

use crate::query::Query;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders};

/// Bordered block whose title reflects the query state
fn query_block<T: Send + Sync + 'static>(title: &str, query: &Query<T>) -> Block<'static> {
  let suffix = if query.is_loading() {
    " (loading...)"
  } else if query.is_error() && query.data().is_some() {
    " (refresh failed)"
  } else {
    ""
  };

  Block::default()
    .title(format!(" {title}{suffix} "))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue))
}

fn highlight_style() -> Style {
  Style::default()
    .bg(Color::DarkGray)
    .add_modifier(Modifier::BOLD)
}
