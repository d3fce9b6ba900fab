//! Inbox tab: message list with read badges and a detail overlay.

use chrono::Utc;
use hm_core::age::relative_age;
use hm_sync::directory::ListPhase;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::centered;
use crate::app::App;

/// Render the inbox into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(store) = app.shell.inbox() else {
    return;
  };
  let state = store.state();
  let now = Utc::now();

  let title = match state.unread_count() {
    0 => " Inbox ".to_owned(),
    n => format!(" Inbox ({n} unread) "),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let empty = match state.phase() {
    ListPhase::Loading => Some("Loading…"),
    ListPhase::Empty => Some("No messages yet."),
    ListPhase::Ready => None,
  };
  if let Some(text) = empty {
    let text = state.last_error.as_deref().unwrap_or(text);
    f.render_widget(
      Paragraph::new(text.to_owned()).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = state
    .messages()
    .iter()
    .map(|msg| {
      let (badge, text_style) = if msg.read {
        ("  ", Style::default().fg(Color::Gray))
      } else {
        ("● ", Style::default().add_modifier(Modifier::BOLD))
      };
      let first_line = msg.text.lines().next().unwrap_or_default();
      ListItem::new(Line::from(vec![
        Span::styled(badge, Style::default().fg(Color::Red)),
        Span::styled(format!("{:<8}", msg.kind_label()), Style::default().fg(Color::Cyan)),
        Span::styled(first_line.to_owned(), text_style),
        Span::styled(
          format!("  {}", relative_age(msg.date, now)),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();

  let mut list_state = ListState::default();
  list_state.select(Some(app.list_cursor.min(items.len().saturating_sub(1))));
  f.render_stateful_widget(
    List::new(items).highlight_style(Style::default().bg(Color::Blue).fg(Color::White)),
    inner,
    &mut list_state,
  );

  if let Some(msg) = state.selected_message() {
    let popup = centered(area, 64, 12);
    let block = Block::default()
      .title(format!(" {} ", msg.kind_label()))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Cyan));
    let mut lines = vec![
      Line::styled(
        format!("{}  ({})", msg.date.format("%Y-%m-%d %H:%M"), relative_age(msg.date, now)),
        Style::default().fg(Color::DarkGray),
      ),
      Line::from(""),
    ];
    lines.extend(msg.text.lines().map(|l| Line::from(l.to_owned())));
    lines.push(Line::from(""));
    lines.push(Line::styled(
      if msg.read { "[c] close" } else { "[r] mark as read  [c] close" },
      Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Clear, popup);
    f.render_widget(
      Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
      popup,
    );
  }
}
