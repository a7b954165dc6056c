//! User detail screen: summary header plus the nested information sections.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use roster_core::user::UserRecord;

use super::user_table::status_style;
use crate::app::{App, UserAction};

// ─── Public entry ─────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(user) = &app.detail else {
    let block = Block::default()
      .title(" User Details ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No user selected.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(6), Constraint::Min(0)])
    .split(area);

  draw_summary(f, rows[0], user);
  draw_sections(f, rows[1], user, app.detail_scroll);
}

// ─── Summary ──────────────────────────────────────────────────────────────────

fn draw_summary(f: &mut Frame, area: Rect, user: &UserRecord) {
  let block = Block::default()
    .title(" User Details ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let stars: String = (1..=3)
    .map(|i| if i <= user.tier { '★' } else { '☆' })
    .collect();

  let lines = vec![
    Line::from(vec![
      Span::styled(
        user.name.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
      ),
      Span::styled(format!("  #{}", user.id), Style::default().fg(Color::DarkGray)),
      Span::raw("   "),
      Span::styled(user.status.to_string(), status_style(&user.status)),
    ]),
    Line::from(vec![
      Span::styled("User's Tier  ", Style::default().fg(Color::Gray)),
      Span::styled(stars, Style::default().fg(Color::Yellow)),
    ]),
    Line::from(vec![
      Span::styled(
        format!("₦{}", user.bank_balance),
        Style::default().add_modifier(Modifier::BOLD),
      ),
      Span::styled(format!("  {}", user.bank_details), Style::default().fg(Color::Gray)),
    ]),
    action_hints(user),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}

fn action_hints(user: &UserRecord) -> Line<'static> {
  let hint = |key: &str, action: UserAction| {
    let style = if action.is_enabled_for(&user.status) {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
    };
    Span::styled(format!("[{key}] {action}  "), style)
  };
  Line::from(vec![
    hint("b", UserAction::Blacklist),
    hint("a", UserAction::Activate),
  ])
}

// ─── Sections ─────────────────────────────────────────────────────────────────

fn draw_sections(f: &mut Frame, area: Rect, user: &UserRecord, scroll: u16) {
  let block = Block::default()
    .title(" General Details ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = Vec::new();

  section(&mut lines, "Personal Information");
  match &user.personal_information {
    Some(p) => {
      field(&mut lines, "Full Name", &p.full_name);
      field(&mut lines, "Phone Number", &p.phone_number);
      field(&mut lines, "Email Address", &p.email);
      field(&mut lines, "BVN", &p.bvn.to_string());
      field(&mut lines, "Gender", &p.gender);
      field(&mut lines, "Marital Status", &p.marital_status);
      field(&mut lines, "Children", &p.children.to_string());
      field(&mut lines, "Type of Residence", &p.type_of_residence);
    }
    None => missing(&mut lines),
  }

  section(&mut lines, "Education and Employment");
  match &user.education_and_employment {
    Some(e) => {
      field(&mut lines, "Level of Education", &e.level_of_education);
      field(&mut lines, "Employment Status", &e.employment_status);
      field(&mut lines, "Sector of Employment", &e.sector_of_employment);
      field(&mut lines, "Duration of Employment", &e.duration_of_employment);
      field(&mut lines, "Office Email", &e.office_email);
      field(&mut lines, "Monthly Income", &e.monthly_income);
      field(&mut lines, "Loan Repayment", &e.loan_repayment);
    }
    None => missing(&mut lines),
  }

  section(&mut lines, "Socials");
  match &user.socials {
    Some(s) => {
      field(&mut lines, "Twitter", &s.twitter);
      field(&mut lines, "Facebook", &s.facebook);
      field(&mut lines, "Instagram", &s.instagram);
    }
    None => missing(&mut lines),
  }

  section(&mut lines, "Guarantor");
  match &user.guarantor {
    Some(g) => {
      field(&mut lines, "Full Name", &g.full_name);
      field(&mut lines, "Phone Number", &g.phone_number);
      field(&mut lines, "Email Address", &g.email);
      field(&mut lines, "Relationship", &g.relationship);
    }
    None => missing(&mut lines),
  }

  f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn section(lines: &mut Vec<Line<'static>>, title: &str) {
  if !lines.is_empty() {
    lines.push(Line::from(""));
  }
  lines.push(Line::from(Span::styled(
    title.to_owned(),
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )));
}

fn field(lines: &mut Vec<Line<'static>>, label: &str, value: &str) {
  lines.push(Line::from(vec![
    Span::styled(format!("  {:<24}", label.to_uppercase()), Style::default().fg(Color::Gray)),
    Span::raw(value.to_owned()),
  ]));
}

fn missing(lines: &mut Vec<Line<'static>>) {
  lines.push(Line::from(Span::styled(
    "  Not provided",
    Style::default().fg(Color::DarkGray),
  )));
}
