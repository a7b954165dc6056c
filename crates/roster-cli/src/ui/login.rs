//! Login screen.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, LoginField};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let form = &app.login;
  let panel = super::centered(area, 52, 13);

  let block = Block::default()
    .title(" Welcome! ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(panel);
  f.render_widget(block, panel);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // subtitle
      Constraint::Length(1),
      Constraint::Length(3), // email
      Constraint::Length(3), // password
      Constraint::Length(1), // error
      Constraint::Min(0),    // hints
    ])
    .split(inner);

  f.render_widget(
    Paragraph::new("Enter details to login.").style(Style::default().fg(Color::Gray)),
    rows[0],
  );

  let masked = if form.show_password {
    form.password.clone()
  } else {
    "•".repeat(form.password.chars().count())
  };

  draw_input(f, rows[2], "Email", &form.email, form.focus == LoginField::Email);
  draw_input(f, rows[3], "Password", &masked, form.focus == LoginField::Password);

  if let Some(error) = &form.error {
    f.render_widget(
      Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
      rows[4],
    );
  }

  let toggle = if form.show_password { "hide" } else { "show" };
  f.render_widget(
    Paragraph::new(Line::from(vec![Span::styled(
      format!("Tab switch  Ctrl-T {toggle} password  Enter log in  Esc quit"),
      Style::default().fg(Color::DarkGray),
    )])),
    rows[5],
  );
}

fn draw_input(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
  let border = if focused {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::DarkGray)
  };
  let text = if focused { format!("{value}_") } else { value.to_owned() };

  f.render_widget(
    Paragraph::new(text).block(
      Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(border),
    ),
    area,
  );
}
