//! TUI rendering: orchestrates all screens.

pub mod login;
pub mod user_detail;
pub mod user_table;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Popup, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  if app.screen == Screen::Login {
    login::draw(f, area, app);
    return;
  }

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0]);

  match app.screen {
    Screen::UserDetail => user_detail::draw(f, rows[1], app),
    Screen::Users | Screen::Login => user_table::draw(f, rows[1], app),
  }

  match &app.popup {
    Some(Popup::Filter(form)) => user_table::draw_filter_popup(f, rows[1], form, app),
    Some(Popup::Actions(menu)) => user_table::draw_action_popup(f, rows[1], menu),
    None => {}
  }

  draw_status(f, rows[2], app);
}

/// A rectangle of at most `width` x `height`, centred in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " roster  [f] filter  [a] actions  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match (&app.screen, &app.popup) {
    (_, Some(Popup::Filter(_))) => (
      "FILTER",
      "Tab/↑↓ field  ←→ choose  Enter apply  Ctrl-U reset  Esc close",
    ),
    (_, Some(Popup::Actions(_))) => ("ACTIONS", "↑↓ choose  Enter run  Esc close"),
    (Screen::UserDetail, None) => (
      "DETAIL",
      "↑↓/jk scroll  b blacklist  a activate  Esc back  q quit",
    ),
    (_, None) if !app.controller.state().is_ready() && !app.is_loading() => {
      ("USERS", "r retry  q quit")
    }
    (_, None) => (
      "USERS",
      "↑↓/jk row  ←→ page  +/- page size  f filter  c clear  a actions  Enter detail  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    format!("{}  │  {hints}", app.status_msg)
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}
