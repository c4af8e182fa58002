use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar: view breadcrumb on the left, status on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], status: Option<&str>) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i + 1 == breadcrumb.len() {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let bar = Style::default().bg(Color::Black);
  frame.render_widget(Paragraph::new(Line::from(spans)).style(bar), area);

  if let Some(status) = status {
    let right = Paragraph::new(Line::from(Span::styled(
      format!("{status} "),
      Style::default().fg(Color::Yellow),
    )))
    .alignment(Alignment::Right)
    .style(bar);
    // Only the right-hand text; the breadcrumb stays visible underneath
    let width = (status.chars().count() as u16 + 1).min(area.width);
    let right_area = Rect::new(area.right() - width, area.y, width, area.height);
    frame.render_widget(right, right_area);
  }
}
