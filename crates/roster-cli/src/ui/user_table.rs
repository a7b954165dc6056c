//! Users screen: the paginated table, its footer and the popups drawn over it.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use roster_core::{
  controller::LoadState,
  filter::FilterField,
  pagination::{PageLink, page_numbers},
  user::UserStatus,
};
use strum::IntoEnumIterator as _;

use crate::app::{ActionMenu, App, FilterForm, UserAction};

const HEADERS: [&str; 6] = [
  "ORGANIZATION",
  "USERNAME",
  "EMAIL",
  "PHONE NUMBER",
  "DATE JOINED",
  "STATUS",
];

// ─── Public entry ─────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  match app.controller.state() {
    LoadState::Ready => draw_table(f, area, app),
    LoadState::Failed(message) => draw_error(f, area, message),
    LoadState::Idle | LoadState::Loading => draw_loading(f, area),
  }
}

/// Colour of the status pill.
pub fn status_style(status: &UserStatus) -> Style {
  let fg = match status {
    UserStatus::Active => Color::Green,
    UserStatus::Inactive => Color::Gray,
    UserStatus::Pending => Color::Yellow,
    UserStatus::Blacklisted => Color::Red,
    UserStatus::Unknown | UserStatus::Other(_) => Color::DarkGray,
  };
  Style::default().fg(fg)
}

// ─── Table ────────────────────────────────────────────────────────────────────

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
  let page = app.controller.current_page();

  let filtered = !app.controller.applied_filter().is_empty();
  let title = if filtered {
    format!(
      " Users ({}/{}) ",
      page.filtered_total,
      app.controller.total()
    )
  } else {
    format!(" Users ({}) ", app.controller.total())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows_area = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(0), Constraint::Length(1)])
    .split(inner);

  let header = Row::new(HEADERS.iter().map(|h| {
    Cell::from(*h).style(
      Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD),
    )
  }));

  let rows: Vec<Row> = page
    .rows
    .iter()
    .map(|user| {
      Row::new(vec![
        Cell::from(user.organization.clone()),
        Cell::from(user.username.clone()),
        Cell::from(user.email.clone()),
        Cell::from(user.phone_number.clone()),
        Cell::from(user.date_joined.clone()),
        Cell::from(user.status.to_string()).style(status_style(&user.status)),
      ])
    })
    .collect();

  if rows.is_empty() {
    f.render_widget(
      Paragraph::new("No users match the current filter.  Press c to clear it.")
        .style(Style::default().fg(Color::DarkGray)),
      rows_area[0],
    );
  } else {
    let widths = [
      Constraint::Percentage(14),
      Constraint::Percentage(14),
      Constraint::Percentage(24),
      Constraint::Percentage(14),
      Constraint::Percentage(22),
      Constraint::Percentage(12),
    ];
    let table = Table::new(rows, widths)
      .header(header.bottom_margin(1))
      .row_highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      );

    let mut state = TableState::default();
    state.select(Some(app.row_cursor));
    f.render_stateful_widget(table, rows_area[0], &mut state);
  }

  draw_footer(f, rows_area[1], page.page, page.page_size, page.total_pages, page.filtered_total);
}

/// `Showing 10 out of 500` on the left, the page-link strip on the right.
fn draw_footer(
  f: &mut Frame,
  area: Rect,
  current: usize,
  page_size: usize,
  total_pages: usize,
  filtered_total: usize,
) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  let showing = Line::from(vec![
    Span::raw("Showing "),
    Span::styled(
      format!(" {page_size} "),
      Style::default().fg(Color::Black).bg(Color::Gray),
    ),
    Span::raw(format!(" out of {filtered_total}")),
  ]);
  f.render_widget(Paragraph::new(showing), cols[0]);

  let mut spans = vec![Span::styled("‹ ", Style::default().fg(Color::DarkGray))];
  for link in page_numbers(current, total_pages) {
    match link {
      PageLink::Page(n) if n == current => spans.push(Span::styled(
        format!("{n} "),
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
      )),
      PageLink::Page(n) => spans.push(Span::raw(format!("{n} "))),
      PageLink::Ellipsis => spans.push(Span::styled("… ", Style::default().fg(Color::DarkGray))),
    }
  }
  spans.push(Span::styled("›", Style::default().fg(Color::DarkGray)));

  f.render_widget(
    Paragraph::new(Line::from(spans)).alignment(ratatui::layout::Alignment::Right),
    cols[1],
  );
}

// ─── Load states ──────────────────────────────────────────────────────────────

fn draw_loading(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Users ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Loading users…").style(Style::default().fg(Color::Yellow)),
    super::centered(inner, 16, 1),
  );
}

fn draw_error(f: &mut Frame, area: Rect, message: &str) {
  let block = Block::default()
    .title(" Could not load users ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines = vec![
    Line::from(Span::styled(message.to_owned(), Style::default().fg(Color::Red))),
    Line::from(""),
    Line::from(Span::styled(
      "Press r to retry.",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(
    Paragraph::new(lines).wrap(Wrap { trim: true }),
    super::centered(inner, 60, 5),
  );
}

// ─── Popups ───────────────────────────────────────────────────────────────────

pub fn draw_filter_popup(f: &mut Frame, area: Rect, form: &FilterForm, app: &App) {
  let popup = super::centered(area, 48, 16);
  f.render_widget(Clear, popup);

  let block = Block::default()
    .title(" Filter ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(popup);
  f.render_widget(block, popup);

  let org_count = app.controller.organizations().len();
  let mut lines: Vec<Line> = Vec::new();
  for field in FilterField::iter() {
    let focused = field == form.focus;
    let value = form.draft.get(field);
    let shown = match (value.is_empty(), field) {
      (true, FilterField::Organization | FilterField::Status) => "Select".to_owned(),
      (true, FilterField::Date) => "Date".to_owned(),
      (true, _) => field.to_string(),
      (false, _) => value.to_owned(),
    };
    let placeholder = value.is_empty();

    let label_style = if focused {
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    let value_style = if placeholder {
      Style::default().fg(Color::DarkGray)
    } else {
      Style::default()
    };

    lines.push(Line::from(Span::styled(field.to_string(), label_style)));
    let mut value_line = vec![
      Span::raw(if focused { "› " } else { "  " }),
      Span::styled(shown, value_style),
    ];
    if focused && !matches!(field, FilterField::Organization | FilterField::Status) {
      value_line.push(Span::raw("_"));
    }
    if focused && field == FilterField::Organization {
      value_line.push(Span::styled(
        format!("  ←→ {org_count} organizations"),
        Style::default().fg(Color::DarkGray),
      ));
    }
    lines.push(Line::from(value_line));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(vec![
    Span::styled(" Enter Filter ", Style::default().fg(Color::Black).bg(Color::Cyan)),
    Span::raw("  "),
    Span::styled(" Ctrl-U Reset ", Style::default().fg(Color::Gray)),
  ]));

  f.render_widget(Paragraph::new(lines), inner);
}

pub fn draw_action_popup(f: &mut Frame, area: Rect, menu: &ActionMenu) {
  let popup = super::centered(area, 28, 5);
  f.render_widget(Clear, popup);

  let block = Block::default()
    .title(format!(" User {} ", menu.user_id))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(popup);
  f.render_widget(block, popup);

  let lines: Vec<Line> = UserAction::iter()
    .enumerate()
    .map(|(i, action)| {
      let mut style = if action.is_enabled_for(&menu.status) {
        Style::default()
      } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
      };
      if i == menu.cursor {
        style = style.bg(Color::Blue).add_modifier(Modifier::BOLD);
      }
      Line::from(Span::styled(format!(" {action} "), style))
    })
    .collect();

  f.render_widget(Paragraph::new(lines), inner);
}
