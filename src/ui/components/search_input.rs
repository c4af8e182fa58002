use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Text changed (emitted on each keystroke, empty string on cancel)
  Changed(String),
  /// Enter pressed; input closes and the term persists
  Submitted(String),
}

/// Search bar opened with `/`.
///
/// The term stays after the bar closes so a view can keep filtering by it;
/// Esc clears it.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
  placeholder: &'static str,
}

impl SearchInput {
  pub fn new(placeholder: &'static str) -> Self {
    Self {
      placeholder,
      ..Self::default()
    }
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Open the bar, keeping the current term for editing.
  pub fn activate(&mut self) {
    self.active = true;
  }

  /// Handle a key event.
  /// Call this regardless of active state; it handles activation too.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(term) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted(term))
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Consumed => {
        KeyResult::Event(SearchEvent::Changed(self.input.value().to_string()))
      }
      // Swallow everything else while typing
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Draw the bar into a 3-line area.
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let border = if self.active {
      Color::Yellow
    } else {
      Color::DarkGray
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border))
      .title(" Search ");

    let line = if self.input.is_empty() && !self.active {
      Line::from(Span::styled(
        self.placeholder,
        Style::default().fg(Color::DarkGray),
      ))
    } else {
      let mut spans = vec![Span::styled("/", Style::default().fg(Color::Yellow))];
      if self.active {
        spans.extend(self.input.spans_with_cursor(Style::default().fg(Color::Yellow)));
      } else {
        spans.push(Span::raw(self.input.value().to_string()));
      }
      Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
  }
}
