//! [`SqliteStorage`], the SQLite implementation of [`KeyValueStorage`].

use std::path::Path;

use chrono::Utc;
use roster_core::overlay::KeyValueStorage;
use rusqlite::OptionalExtension as _;

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Durable key-value storage backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStorage {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStorage {
  /// Open (or create) a store at `path` and run schema initialisation.
  /// Missing parent directories are created.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }

    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite storage");
    Ok(store)
  }

  /// Open an in-memory store for tests and throwaway sessions.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every stored key, sorted.
  pub async fn keys(&self) -> Result<Vec<String>> {
    let keys = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(keys)
  }
}

// ─── KeyValueStorage impl ────────────────────────────────────────────────────

impl KeyValueStorage for SqliteStorage {
  type Error = Error;

  async fn get_item(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();

    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM kv_store WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(value)
  }

  async fn set_item(&self, key: &str, value: String) -> Result<()> {
    let key    = key.to_owned();
    let at_str = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value      = excluded.value,
             updated_at = excluded.updated_at",
          rusqlite::params![key, value, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn remove_item(&self, key: &str) -> Result<()> {
    let key = key.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM kv_store WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}
