//! User directory service: fixture loading and record normalization.
//!
//! All default-filling lives in [`normalize`], so every consumer sees the
//! same canonical [`UserRecord`] shape. Status resolution joins the raw
//! record with the status overlay by id: overlay value, then the lower-cased
//! fixture status, then `unknown`.

use std::{future::Future, sync::Arc};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset as _, Utc};

use crate::{
  LoadError,
  overlay::{KeyValueStorage, StatusOverlay, StatusOverlayStore},
  user::{
    EducationAndEmployment, Fixture, Guarantor, PersonalInformation, RawEducationAndEmployment,
    RawGuarantor, RawPersonalInformation, RawScalar, RawSocials, RawUser, Socials, UserRecord,
    UserStatus,
  },
};

/// `chrono` format of [`UserRecord::date_joined`], e.g.
/// `May 15, 2020, 10:00 AM`.
pub const DATE_JOINED_FORMAT: &str = "%b %d, %Y, %I:%M %p";

const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_AVATAR: &str = "https://default-avatar.com";

// ─── Fixture transport ───────────────────────────────────────────────────────

/// Where the raw fixture document comes from (a file, an HTTP endpoint, a
/// string in a test).
pub trait FixtureSource: Send + Sync {
  /// Fetch the fixture body as text.
  fn fetch(&self) -> impl Future<Output = Result<String, LoadError>> + Send + '_;
}

/// Parse a fixture body. Anything other than `{ "users": [...] }` is
/// malformed.
pub fn parse_fixture(body: &str) -> Result<Fixture, LoadError> {
  Ok(serde_json::from_str(body)?)
}

// ─── Normalization ───────────────────────────────────────────────────────────

/// Treat empty strings as missing, the way the fixture's producers do.
fn text(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.is_empty())
}

fn text_or(value: &Option<String>, default: &str) -> String {
  text(value).unwrap_or(default).to_owned()
}

fn scalar_or(value: &Option<RawScalar>, default: &str) -> String {
  value
    .as_ref()
    .and_then(RawScalar::to_text)
    .unwrap_or_else(|| default.to_owned())
}

/// Read an ISO-8601 timestamp: RFC 3339, naive date-time (UTC), or a bare
/// date (midnight UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(dt.and_utc());
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

/// Render an ISO timestamp as a `date_joined` display string in `offset`.
/// Missing or unreadable timestamps render as `N/A`.
pub fn format_date_joined(raw: Option<&str>, offset: FixedOffset) -> String {
  let Some(raw) = raw.filter(|s| !s.is_empty()) else {
    return NOT_AVAILABLE.to_owned();
  };
  match parse_timestamp(raw) {
    Some(dt) => dt.with_timezone(&offset).format(DATE_JOINED_FORMAT).to_string(),
    None => {
      tracing::warn!(raw, "unreadable dateJoined");
      NOT_AVAILABLE.to_owned()
    }
  }
}

/// Overlay value for `id`, else the lower-cased fixture status, else
/// `unknown`.
fn resolve_status(id: &str, raw: Option<&str>, overlay: &StatusOverlay) -> UserStatus {
  if let Some(s) = overlay.get(id).filter(|s| !s.is_empty()) {
    return UserStatus::from(s.as_str());
  }
  raw
    .filter(|s| !s.is_empty())
    .map(|s| UserStatus::from(s.to_lowercase()))
    .unwrap_or_default()
}

fn personal_information(raw: &RawPersonalInformation) -> PersonalInformation {
  PersonalInformation {
    full_name:         text_or(&raw.full_name, UNKNOWN),
    email:             text_or(&raw.email, NOT_AVAILABLE),
    bvn:               raw.bvn.unwrap_or(0),
    gender:            text_or(&raw.gender, NOT_AVAILABLE),
    marital_status:    text_or(&raw.marital_status, NOT_AVAILABLE),
    children:          raw.children.unwrap_or(0),
    type_of_residence: text_or(&raw.type_of_residence, NOT_AVAILABLE),
    phone_number:      scalar_or(&raw.phone_number, NOT_AVAILABLE),
  }
}

fn education_and_employment(raw: &RawEducationAndEmployment) -> EducationAndEmployment {
  EducationAndEmployment {
    level_of_education:     text_or(&raw.level_of_education, NOT_AVAILABLE),
    employment_status:      text_or(&raw.employment_status, NOT_AVAILABLE),
    sector_of_employment:   text_or(&raw.sector_of_employment, NOT_AVAILABLE),
    duration_of_employment: text_or(&raw.duration_of_employment, NOT_AVAILABLE),
    office_email:           text_or(&raw.office_email, NOT_AVAILABLE),
    monthly_income:         text_or(&raw.monthly_income, NOT_AVAILABLE),
    loan_repayment:         text_or(&raw.loan_repayment, NOT_AVAILABLE),
  }
}

fn socials(raw: &RawSocials) -> Socials {
  Socials {
    twitter:   text_or(&raw.twitter, NOT_AVAILABLE),
    facebook:  text_or(&raw.facebook, NOT_AVAILABLE),
    instagram: text_or(&raw.instagram, NOT_AVAILABLE),
  }
}

fn guarantor(raw: &RawGuarantor) -> Guarantor {
  Guarantor {
    full_name:    text_or(&raw.full_name, NOT_AVAILABLE),
    phone_number: scalar_or(&raw.phone_number, NOT_AVAILABLE),
    email:        text_or(&raw.email, NOT_AVAILABLE),
    relationship: text_or(&raw.relationship, NOT_AVAILABLE),
  }
}

/// Turn the raw record at 0-based `index` into a canonical [`UserRecord`].
pub fn normalize(
  index: usize,
  raw: &RawUser,
  overlay: &StatusOverlay,
  offset: FixedOffset,
) -> UserRecord {
  let id = raw
    .id
    .as_ref()
    .and_then(|id| id.to_text())
    .unwrap_or_else(|| (index + 1).to_string());

  let full_name = raw
    .personal_information
    .as_ref()
    .and_then(|p| text(&p.full_name));

  let username = full_name
    .and_then(|n| n.split_whitespace().next())
    .or_else(|| text(&raw.username))
    .unwrap_or(UNKNOWN)
    .to_owned();

  let status = resolve_status(&id, raw.status.as_deref(), overlay);

  UserRecord {
    organization: text_or(&raw.organization, UNKNOWN),
    username,
    email: text_or(&raw.email, NOT_AVAILABLE),
    phone_number: scalar_or(&raw.phone_number, NOT_AVAILABLE),
    date_joined: format_date_joined(raw.date_joined.as_deref(), offset),
    status,
    avatar: text_or(&raw.avatar, DEFAULT_AVATAR),
    name: text(&raw.name).or(full_name).unwrap_or(UNKNOWN).to_owned(),
    tier: raw.tier.filter(|t| *t != 0).unwrap_or(1),
    bank_balance: raw
      .bank_balance
      .as_ref()
      .and_then(|b| b.to_text())
      .unwrap_or_else(|| "0".to_owned()),
    bank_details: text_or(&raw.bank_details, NOT_AVAILABLE),
    personal_information: raw.personal_information.as_ref().map(personal_information),
    education_and_employment: raw
      .education_and_employment
      .as_ref()
      .map(education_and_employment),
    socials: raw.socials.as_ref().map(socials),
    guarantor: raw.guarantor.as_ref().map(guarantor),
    id,
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Loads the canonical user collection: fixture + status overlay.
///
/// Cloning is cheap; the fixture source and overlay store are shared.
pub struct UserDirectory<F, S> {
  source:  Arc<F>,
  overlay: Arc<StatusOverlayStore<S>>,
  offset:  FixedOffset,
}

impl<F, S> Clone for UserDirectory<F, S> {
  fn clone(&self) -> Self {
    Self {
      source:  Arc::clone(&self.source),
      overlay: Arc::clone(&self.overlay),
      offset:  self.offset,
    }
  }
}

impl<F: FixtureSource, S: KeyValueStorage> UserDirectory<F, S> {
  /// A directory rendering join dates in UTC.
  pub fn new(source: F, overlay: StatusOverlayStore<S>) -> Self {
    Self {
      source:  Arc::new(source),
      overlay: Arc::new(overlay),
      offset:  Utc.fix(),
    }
  }

  /// Render join dates in `offset` instead of UTC.
  pub fn with_offset(mut self, offset: FixedOffset) -> Self {
    self.offset = offset;
    self
  }

  pub fn overlay(&self) -> &StatusOverlayStore<S> { &self.overlay }

  /// Fetch, parse and normalize the fixture. A fresh collection is built on
  /// every call.
  pub async fn load(&self) -> Result<Vec<UserRecord>, LoadError> {
    let body = self.source.fetch().await?;
    let fixture = parse_fixture(&body)?;
    let overlay = self.overlay.get_all().await;

    let users: Vec<UserRecord> = fixture
      .users
      .iter()
      .enumerate()
      .map(|(i, raw)| normalize(i, raw, &overlay, self.offset))
      .collect();

    tracing::info!(count = users.len(), overrides = overlay.len(), "directory loaded");
    Ok(users)
  }
}
