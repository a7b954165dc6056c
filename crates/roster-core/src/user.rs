//! User records: the raw fixture shape and the canonical, normalized shape.
//!
//! [`RawUser`] mirrors whatever the fixture happens to contain: every field is
//! optional and some fields accept either a string or a number. [`UserRecord`]
//! is what the rest of the system sees; it is produced exclusively by
//! [`crate::directory::normalize`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

// ─── Status ──────────────────────────────────────────────────────────────────

/// The account status of a user.
///
/// Known names are recognised case-insensitively. Anything else is kept
/// verbatim in [`UserStatus::Other`] so an unexpected fixture value is never
/// lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
  Active,
  Inactive,
  Pending,
  Blacklisted,
  #[default]
  Unknown,
  Other(String),
}

impl UserStatus {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
      Self::Pending => "pending",
      Self::Blacklisted => "blacklisted",
      Self::Unknown => "unknown",
      Self::Other(s) => s,
    }
  }
}

impl From<&str> for UserStatus {
  fn from(s: &str) -> Self {
    match s.to_ascii_lowercase().as_str() {
      "active" => Self::Active,
      "inactive" => Self::Inactive,
      "pending" => Self::Pending,
      "blacklisted" => Self::Blacklisted,
      "unknown" => Self::Unknown,
      _ => Self::Other(s.to_owned()),
    }
  }
}

impl From<String> for UserStatus {
  fn from(s: String) -> Self { Self::from(s.as_str()) }
}

impl From<UserStatus> for String {
  fn from(s: UserStatus) -> Self { s.as_str().to_owned() }
}

impl FromStr for UserStatus {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::from(s)) }
}

impl fmt::Display for UserStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Canonical record ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
  pub full_name:         String,
  pub email:             String,
  pub bvn:               u64,
  pub gender:            String,
  pub marital_status:    String,
  pub children:          u32,
  pub type_of_residence: String,
  pub phone_number:      String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationAndEmployment {
  pub level_of_education:     String,
  pub employment_status:      String,
  pub sector_of_employment:   String,
  pub duration_of_employment: String,
  pub office_email:           String,
  pub monthly_income:         String,
  pub loan_repayment:         String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socials {
  pub twitter:   String,
  pub facebook:  String,
  pub instagram: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guarantor {
  pub full_name:    String,
  pub phone_number: String,
  pub email:        String,
  pub relationship: String,
}

/// A normalized user. `id` is assigned at load time and never changes; it is
/// also the join key into the status overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
  pub id:                       String,
  pub organization:             String,
  pub username:                 String,
  pub email:                    String,
  pub phone_number:             String,
  /// Display string, e.g. `May 15, 2020, 10:00 AM`, or `N/A`.
  pub date_joined:              String,
  pub status:                   UserStatus,
  pub avatar:                   String,
  pub name:                     String,
  pub tier:                     u32,
  pub bank_balance:             String,
  pub bank_details:             String,
  pub personal_information:     Option<PersonalInformation>,
  pub education_and_employment: Option<EducationAndEmployment>,
  pub socials:                  Option<Socials>,
  pub guarantor:                Option<Guarantor>,
}

// ─── Raw fixture shape ───────────────────────────────────────────────────────

/// A JSON scalar that the fixture may encode either as a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
  Text(String),
  Number(serde_json::Number),
}

impl RawScalar {
  /// The scalar rendered as a string, or `None` when it is falsy (empty
  /// string or zero).
  pub fn to_text(&self) -> Option<String> {
    match self {
      Self::Text(s) if s.is_empty() => None,
      Self::Text(s) => Some(s.clone()),
      Self::Number(n) if n.as_f64() == Some(0.0) => None,
      Self::Number(n) => Some(n.to_string()),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPersonalInformation {
  pub full_name:         Option<String>,
  pub email:             Option<String>,
  pub bvn:               Option<u64>,
  pub gender:            Option<String>,
  pub marital_status:    Option<String>,
  pub children:          Option<u32>,
  pub type_of_residence: Option<String>,
  pub phone_number:      Option<RawScalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEducationAndEmployment {
  pub level_of_education:     Option<String>,
  pub employment_status:      Option<String>,
  pub sector_of_employment:   Option<String>,
  pub duration_of_employment: Option<String>,
  pub office_email:           Option<String>,
  pub monthly_income:         Option<String>,
  pub loan_repayment:         Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSocials {
  pub twitter:   Option<String>,
  pub facebook:  Option<String>,
  pub instagram: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGuarantor {
  pub full_name:    Option<String>,
  pub phone_number: Option<RawScalar>,
  pub email:        Option<String>,
  pub relationship: Option<String>,
}

/// A user as found in the fixture; every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
  pub id:                       Option<RawScalar>,
  pub username:                 Option<String>,
  pub organization:             Option<String>,
  pub avatar:                   Option<String>,
  pub name:                     Option<String>,
  pub tier:                     Option<u32>,
  pub bank_balance:             Option<RawScalar>,
  pub bank_details:             Option<String>,
  pub email:                    Option<String>,
  /// Often stored as a bare number.
  pub phone_number:             Option<RawScalar>,
  /// ISO-8601 timestamp.
  pub date_joined:              Option<String>,
  pub status:                   Option<String>,
  pub personal_information:     Option<RawPersonalInformation>,
  pub education_and_employment: Option<RawEducationAndEmployment>,
  pub socials:                  Option<RawSocials>,
  pub guarantor:                Option<RawGuarantor>,
}

/// The fixture document: `{ "users": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
  pub users: Vec<RawUser>,
}
