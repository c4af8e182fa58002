use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::ui::model::{error_message, EMPTY_HINT, EMPTY_TITLE, ERROR_TITLE};

/// Truncate to `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Centered title and body inside `block`
pub fn draw_message(frame: &mut Frame, area: Rect, block: Block, title: &str, body: &str, color: Color) {
  let text = Text::from(vec![
    Line::raw(""),
    Line::styled(title.to_string(), Style::default().fg(color).bold()),
    Line::raw(""),
    Line::styled(body.to_string(), Style::default().fg(Color::DarkGray)),
  ]);

  let paragraph = Paragraph::new(text)
    .block(block)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}

pub fn draw_error(frame: &mut Frame, area: Rect, block: Block, what: &str) {
  draw_message(frame, area, block, ERROR_TITLE, &error_message(what), Color::Red);
}

pub fn draw_empty(frame: &mut Frame, area: Rect, block: Block) {
  draw_message(frame, area, block, EMPTY_TITLE, EMPTY_HINT, Color::White);
}
