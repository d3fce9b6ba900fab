//! Network tab: people list with stats.

use hm_sync::directory::ListPhase;
use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::App;

/// Render the directory into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(store) = app.shell.directory() else {
    return;
  };
  let state = store.state();

  let [stats_area, list_area] =
    Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

  let total = state
    .stats
    .as_ref()
    .map(|s| s.total_people.to_string())
    .unwrap_or_else(|| "…".into());
  f.render_widget(
    Paragraph::new(Line::from(vec![
      Span::styled("People in your network: ", Style::default().fg(Color::Gray)),
      Span::styled(total, Style::default().add_modifier(Modifier::BOLD)),
    ]))
    .block(
      Block::default()
        .title(" Stats ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray)),
    ),
    stats_area,
  );

  let block = Block::default()
    .title(format!(" People ({}) ", state.people().len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(list_area);
  f.render_widget(block, list_area);

  let empty = match state.phase() {
    ListPhase::Loading => Some("Loading…"),
    ListPhase::Empty => Some("Nobody here yet. Press [a] to add someone."),
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
    .people()
    .iter()
    .map(|person| {
      let mut spans = vec![Span::styled(
        person.name().to_owned(),
        Style::default().add_modifier(Modifier::BOLD),
      )];
      if let Some(nick) = person.nickname() {
        spans.push(Span::styled(format!("  \"{nick}\""), Style::default().fg(Color::Gray)));
      }
      if let Some(city) = &person.fields.city {
        spans.push(Span::styled(format!("  {city}"), Style::default().fg(Color::DarkGray)));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut list_state = ListState::default();
  list_state.select(Some(app.list_cursor.min(items.len().saturating_sub(1))));
  f.render_stateful_widget(
    List::new(items).highlight_style(Style::default().bg(Color::Blue).fg(Color::White)),
    inner,
    &mut list_state,
  );
}
