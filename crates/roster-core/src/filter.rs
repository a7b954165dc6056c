//! Filter predicate engine.
//!
//! A [`FilterSpec`] holds up to six free-form constraints. Blank fields impose
//! nothing. Categorical fields (organization, status) must match exactly,
//! ignoring case; free-text identifiers (username, email) match as
//! case-insensitive substrings; phone numbers match as case-sensitive
//! substrings; dates match on the calendar day.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator as _};

use crate::{FilterParseError, directory::DATE_JOINED_FORMAT, user::UserRecord};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// One constrainable column of the user table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum FilterField {
  #[strum(to_string = "Organization")]
  Organization,
  #[strum(to_string = "Username")]
  Username,
  #[strum(to_string = "Email")]
  Email,
  #[strum(to_string = "Date")]
  Date,
  #[strum(to_string = "Phone Number")]
  PhoneNumber,
  #[strum(to_string = "Status")]
  Status,
}

// ─── Spec ────────────────────────────────────────────────────────────────────

/// The applied (or in-progress) filter. Blank or whitespace-only fields mean
/// "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
  pub organization: String,
  pub username:     String,
  pub email:        String,
  pub date:         String,
  pub phone_number: String,
  pub status:       String,
}

impl FilterSpec {
  pub fn get(&self, field: FilterField) -> &str {
    match field {
      FilterField::Organization => &self.organization,
      FilterField::Username => &self.username,
      FilterField::Email => &self.email,
      FilterField::Date => &self.date,
      FilterField::PhoneNumber => &self.phone_number,
      FilterField::Status => &self.status,
    }
  }

  pub fn get_mut(&mut self, field: FilterField) -> &mut String {
    match field {
      FilterField::Organization => &mut self.organization,
      FilterField::Username => &mut self.username,
      FilterField::Email => &mut self.email,
      FilterField::Date => &mut self.date,
      FilterField::PhoneNumber => &mut self.phone_number,
      FilterField::Status => &mut self.status,
    }
  }

  /// Builder-style setter, handy for callers and tests.
  pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
    *self.get_mut(field) = value.into();
    self
  }

  /// `true` iff every field is blank; lets callers skip the full scan.
  pub fn is_empty(&self) -> bool {
    FilterField::iter().all(|f| self.get(f).trim().is_empty())
  }
}

// ─── Predicate ───────────────────────────────────────────────────────────────

/// `true` iff `record` satisfies every non-blank field of `spec`.
pub fn matches(record: &UserRecord, spec: &FilterSpec) -> bool {
  FilterField::iter().all(|field| {
    let wanted = spec.get(field).trim();
    wanted.is_empty() || field_matches(record, field, wanted)
  })
}

fn field_matches(record: &UserRecord, field: FilterField, wanted: &str) -> bool {
  match field {
    FilterField::Organization => eq_ignore_case(&record.organization, wanted),
    FilterField::Status => eq_ignore_case(record.status.as_str(), wanted),
    FilterField::Username => contains_ignore_case(&record.username, wanted),
    FilterField::Email => contains_ignore_case(&record.email, wanted),
    FilterField::PhoneNumber => record.phone_number.contains(wanted),
    FilterField::Date => same_day(&record.date_joined, wanted),
  }
}

fn eq_ignore_case(a: &str, b: &str) -> bool { a.to_lowercase() == b.to_lowercase() }

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Calendar-day comparison. An unparseable date on either side skips the
/// constraint instead of excluding the record.
fn same_day(date_joined: &str, wanted: &str) -> bool {
  match (parse_calendar_date(wanted), parse_calendar_date(date_joined)) {
    (Ok(a), Ok(b)) => a == b,
    (Err(e), _) | (_, Err(e)) => {
      tracing::debug!(error = %e, "skipping date constraint");
      true
    }
  }
}

// ─── Date parsing ────────────────────────────────────────────────────────────

const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y"];

/// Read a calendar date from a filter input or a `date_joined` display
/// string. Time of day, where present, is discarded.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, FilterParseError> {
  let s = input.trim();

  if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATE_JOINED_FORMAT) {
    return Ok(dt.date());
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.date_naive());
  }
  DATE_ONLY_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    .ok_or_else(|| FilterParseError(s.to_owned()))
}
