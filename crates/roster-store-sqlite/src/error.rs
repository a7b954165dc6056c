//! Error type for `roster-store-sqlite`.
//!
//! Callers of the status overlay never see these: the overlay store logs them
//! and carries on without overrides.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("could not create store directory: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
