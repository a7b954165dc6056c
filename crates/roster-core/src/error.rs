//! Error types for `roster-core`.

use thiserror::Error;

/// Failure to obtain the canonical user collection from the fixture.
///
/// Terminal for the load attempt that produced it; the caller shows an error
/// state and retries on explicit user request.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("fixture unreachable: {0}")]
  Unreachable(String),

  #[error("fixture request failed with status {0}")]
  Status(u16),

  #[error("malformed fixture: {0}")]
  Malformed(#[from] serde_json::Error),
}

/// A filter date that could not be read as a calendar date.
///
/// Never surfaces past the filter engine: the date constraint is skipped.
#[derive(Debug, Error)]
#[error("unparseable date: {0:?}")]
pub struct FilterParseError(pub String);

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
