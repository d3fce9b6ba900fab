//! TUI rendering. Every frame draws from fresh store snapshots.

pub mod inbox;
pub mod network;
pub mod profile;

use hm_sync::{navigation::Tab, shell::Screen};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use strum::IntoEnumIterator;

use crate::{
  app::{App, Mode},
  form::PersonForm,
};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  let screen = app.shell.screen();
  draw_header(f, rows[0], app, &screen);
  match &screen {
    Screen::Loading => draw_notice(f, rows[1], "Loading…", Color::DarkGray),
    Screen::Unsupported => draw_notice(
      f,
      rows[1],
      "This environment is not supported.\nOpen HM from the host application.",
      Color::Yellow,
    ),
    Screen::Tabs(Tab::Inbox) => inbox::draw(f, rows[1], app),
    Screen::Tabs(Tab::Network) => network::draw(f, rows[1], app),
    Screen::Tabs(Tab::Me) => draw_me(f, rows[1], app),
    Screen::Profile(_) => profile::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app, &screen);

  match &app.mode {
    Mode::Normal => {}
    Mode::Form(form) => draw_form(f, area, form),
    Mode::ConfirmDelete(_) => {
      let popup = centered(area, 44, 5);
      let block = Block::default()
        .title(" Delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
      f.render_widget(Clear, popup);
      f.render_widget(
        Paragraph::new("Delete this person? This cannot be undone.\n\n[y] delete  [n] keep")
          .block(block),
        popup,
      );
    }
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App, screen: &Screen) {
  let mut spans = vec![Span::styled(
    " hm ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )];

  if matches!(screen, Screen::Tabs(_) | Screen::Profile(_)) {
    let unread = app
      .shell
      .inbox()
      .map(|s| s.state().unread_count())
      .unwrap_or_default();
    for (i, tab) in Tab::iter().enumerate() {
      let label = match tab {
        Tab::Inbox if unread > 0 => format!(" {}:Inbox ({unread}) ", i + 1),
        Tab::Inbox => format!(" {}:Inbox ", i + 1),
        Tab::Network => format!(" {}:Network ", i + 1),
        Tab::Me => format!(" {}:Me ", i + 1),
      };
      let style = if *screen == Screen::Tabs(tab) {
        Style::default().fg(Color::Black).bg(Color::Cyan)
      } else {
        Style::default().fg(Color::Gray)
      };
      spans.push(Span::styled(label, style));
    }
  }

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Simple screens ───────────────────────────────────────────────────────────

fn draw_notice(f: &mut Frame, area: Rect, text: &str, color: Color) {
  let lines = text.lines().count() as u16;
  let [middle] = Layout::vertical([Constraint::Length(lines)])
    .flex(Flex::Center)
    .areas(area);
  f.render_widget(
    Paragraph::new(text.to_owned())
      .style(Style::default().fg(color))
      .centered(),
    middle,
  );
}

fn draw_me(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Me ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(user) = app.shell.session().get() else {
    f.render_widget(Paragraph::new("Not signed in."), inner);
    return;
  };
  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let mut lines = vec![
    Line::from(vec![Span::styled(format!("{:<10}", "name"), label), Span::raw(user.name.clone())]),
    Line::from(vec![
      Span::styled(format!("{:<10}", "avatar"), label),
      Span::raw(user.avatar_or_placeholder().to_owned()),
    ]),
  ];
  for key in user.extra.keys() {
    if let Some(value) = user.field(key) {
      lines.push(Line::from(vec![
        Span::styled(format!("{key:<10}"), label),
        Span::raw(value.to_owned()),
      ]));
    }
  }
  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Form popup ───────────────────────────────────────────────────────────────

fn draw_form(f: &mut Frame, area: Rect, form: &PersonForm) {
  let height = form.rows.len() as u16 + 5;
  let popup = centered(area, 60, height);
  let block = Block::default()
    .title(form.title())
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(popup);
  f.render_widget(Clear, popup);
  f.render_widget(block, popup);

  let mut lines: Vec<Line> = form
    .rows
    .iter()
    .enumerate()
    .map(|(i, (field, value))| {
      let focused = i == form.focus;
      let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
      let mut spans = vec![Span::styled(format!("{:<11}", field.to_string()), label)];
      if focused {
        spans.push(Span::styled(format!("{value}_"), Style::default().fg(Color::Yellow)));
      } else {
        spans.push(Span::raw(value.clone()));
      }
      if value.is_empty() && !field.hint().is_empty() {
        spans.push(Span::styled(
          format!("  {}", field.hint()),
          Style::default().fg(Color::DarkGray),
        ));
      }
      Line::from(spans)
    })
    .collect();

  lines.push(Line::from(""));
  match &form.error {
    Some(e) => lines.push(Line::styled(e.clone(), Style::default().fg(Color::Red))),
    None => lines.push(Line::from("")),
  }
  lines.push(Line::styled(
    "Tab next  Enter save  Esc cancel",
    Style::default().fg(Color::DarkGray),
  ));
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// A `width` × `height` rect centred in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
    .flex(Flex::Center)
    .areas(row);
  cell
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App, screen: &Screen) {
  let inbox_open = app
    .shell
    .inbox()
    .is_some_and(|s| s.state().selected.is_some());
  let (mode_label, hints) = match (&app.mode, screen) {
    (Mode::Form(_), _) => ("EDIT", "Type to enter  Tab next field  Enter save  Esc cancel"),
    (Mode::ConfirmDelete(_), _) => ("CONFIRM", "y delete  n keep"),
    (_, Screen::Loading) => ("LOADING", "q quit"),
    (_, Screen::Unsupported) => ("UNSUPPORTED", "q quit"),
    (_, Screen::Tabs(Tab::Inbox)) if inbox_open => ("MESSAGE", "Enter/r mark as read  Esc/c close"),
    (_, Screen::Tabs(Tab::Inbox)) => ("INBOX", "↑↓/jk navigate  Enter open  R reload  Tab/1-3 tabs  q quit"),
    (_, Screen::Tabs(Tab::Network)) => (
      "NETWORK",
      "↑↓/jk navigate  Enter profile  a add  R reload  Tab/1-3 tabs  q quit",
    ),
    (_, Screen::Tabs(Tab::Me)) => ("ME", "Tab/1-3 tabs  q quit"),
    (_, Screen::Profile(_)) => ("PROFILE", "e edit  d delete  Esc back  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
