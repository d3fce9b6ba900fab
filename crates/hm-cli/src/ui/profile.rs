//! Profile page for one person.

use hm_core::person::Person;
use hm_sync::profile::ProfileState;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

/// Render the mounted profile into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(view) = app.shell.profile() else {
    return;
  };
  let state = view.state();

  let title = match &state {
    ProfileState::Found(p) => format!(" {} ", p.name()),
    _ => " Profile ".to_owned(),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let hint = |text: &str| Paragraph::new(text.to_owned()).style(Style::default().fg(Color::DarkGray));
  match &state {
    ProfileState::Loading => f.render_widget(hint("Loading…"), inner),
    ProfileState::NotFound => f.render_widget(hint("This person could not be found."), inner),
    ProfileState::Removed => f.render_widget(hint("This person was deleted."), inner),
    ProfileState::Found(person) => {
      f.render_widget(Paragraph::new(lines(person)).wrap(Wrap { trim: false }), inner)
    }
  }
}

fn lines(person: &Person) -> Vec<Line<'static>> {
  let f = &person.fields;
  let rows: [(&str, Option<String>); 9] = [
    ("name", Some(f.name.clone())),
    ("nickname", f.nickname.clone()),
    ("gender", f.gender.map(|g| g.to_string())),
    ("birthday", f.birthday.map(|d| d.format("%Y-%m-%d").to_string())),
    ("city", f.city.clone()),
    ("phone", f.phone.clone()),
    ("email", f.email.clone()),
    ("resources", f.resources.clone()),
    ("needs", f.needs.clone()),
  ];

  let mut out: Vec<Line> = rows
    .into_iter()
    .map(|(label, value)| {
      let value = match value {
        Some(v) => Span::raw(v),
        None => Span::styled("—", Style::default().fg(Color::DarkGray)),
      };
      Line::from(vec![
        Span::styled(
          format!("{label:<12}"),
          Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        value,
      ])
    })
    .collect();

  out.push(Line::from(""));
  let mut stamp = format!("added {}", person.created_at.format("%Y-%m-%d"));
  if let Some(updated) = person.updated_at {
    stamp.push_str(&format!(", updated {}", updated.format("%Y-%m-%d")));
  }
  out.push(Line::styled(stamp, Style::default().fg(Color::DarkGray)));
  out
}
