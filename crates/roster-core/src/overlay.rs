//! Status overlay: user-id → status overrides kept in durable storage.
//!
//! The storage itself is abstracted by [`KeyValueStorage`], a string
//! key/value interface in the spirit of browser local storage. Backends
//! (e.g. `roster-store-sqlite`) implement it; [`MemoryStorage`] is provided
//! for tests and embedders.
//!
//! The overlay is an enhancement, not critical data: every storage or parse
//! failure is logged and degraded to "no overrides" rather than propagated.

use std::{
  collections::{BTreeMap, HashMap},
  convert::Infallible,
  future::Future,
  sync::{Arc, Mutex},
};

use crate::user::{UserRecord, UserStatus};

/// Key holding the serialized `{ id: status }` mapping.
pub const STATUS_KEY: &str = "user_status_updates";

/// Key holding the serialized snapshot of the last selected user.
pub const SELECTED_USER_KEY: &str = "selected_user";

/// The persisted overlay: user id → status string.
pub type StatusOverlay = BTreeMap<String, String>;

// ─── Storage trait ───────────────────────────────────────────────────────────

/// Abstraction over a durable string key/value store.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait KeyValueStorage: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`, or `None` if absent.
  fn get_item<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn set_item<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete `key`. Deleting a missing key is not an error.
  fn remove_item<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── In-memory storage ───────────────────────────────────────────────────────

/// A process-local [`KeyValueStorage`]. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }

  fn with_items<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> T {
    // A poisoned lock still guards a valid map.
    let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut items)
  }
}

impl KeyValueStorage for MemoryStorage {
  type Error = Infallible;

  async fn get_item(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(self.with_items(|items| items.get(key).cloned()))
  }

  async fn set_item(&self, key: &str, value: String) -> Result<(), Infallible> {
    self.with_items(|items| items.insert(key.to_owned(), value));
    Ok(())
  }

  async fn remove_item(&self, key: &str) -> Result<(), Infallible> {
    self.with_items(|items| items.remove(key));
    Ok(())
  }
}

// ─── Overlay store ───────────────────────────────────────────────────────────

/// Typed access to the status overlay and the selected-user snapshot.
///
/// No method fails: unreadable or unwritable storage is logged and treated as
/// empty.
#[derive(Debug, Clone)]
pub struct StatusOverlayStore<S> {
  storage: S,
}

impl<S: KeyValueStorage> StatusOverlayStore<S> {
  pub fn new(storage: S) -> Self { Self { storage } }

  pub fn storage(&self) -> &S { &self.storage }

  /// The whole persisted overlay; empty when absent, unreadable or corrupt.
  pub async fn get_all(&self) -> StatusOverlay {
    let raw = match self.storage.get_item(STATUS_KEY).await {
      Ok(Some(raw)) => raw,
      Ok(None) => return StatusOverlay::new(),
      Err(e) => {
        tracing::error!(error = %e, "reading status overlay failed");
        return StatusOverlay::new();
      }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
      tracing::warn!(error = %e, "ignoring corrupt status overlay");
      StatusOverlay::new()
    })
  }

  /// Merge `{ id: status }` into the persisted overlay (read-modify-write,
  /// last write wins).
  pub async fn set_status(&self, id: &str, status: &UserStatus) {
    let mut overlay = self.get_all().await;
    overlay.insert(id.to_owned(), status.to_string());

    let encoded = match serde_json::to_string(&overlay) {
      Ok(encoded) => encoded,
      Err(e) => {
        tracing::error!(error = %e, "encoding status overlay failed");
        return;
      }
    };

    match self.storage.set_item(STATUS_KEY, encoded).await {
      Ok(()) => tracing::debug!(id, %status, "status overlay saved"),
      Err(e) => tracing::error!(error = %e, id, "saving status overlay failed"),
    }
  }

  /// Persist a snapshot of the last selected user.
  pub async fn set_selected_user(&self, user: &UserRecord) {
    let encoded = match serde_json::to_string(user) {
      Ok(encoded) => encoded,
      Err(e) => {
        tracing::error!(error = %e, "encoding selected user failed");
        return;
      }
    };

    if let Err(e) = self.storage.set_item(SELECTED_USER_KEY, encoded).await {
      tracing::error!(error = %e, id = %user.id, "saving selected user failed");
    }
  }

  /// The last selected user snapshot, if present and readable.
  pub async fn selected_user(&self) -> Option<UserRecord> {
    let raw = match self.storage.get_item(SELECTED_USER_KEY).await {
      Ok(raw) => raw?,
      Err(e) => {
        tracing::error!(error = %e, "reading selected user failed");
        return None;
      }
    };

    serde_json::from_str(&raw)
      .inspect_err(|e| tracing::warn!(error = %e, "ignoring corrupt selected user"))
      .ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> StatusOverlayStore<MemoryStorage> {
    StatusOverlayStore::new(MemoryStorage::new())
  }

  #[tokio::test]
  async fn empty_storage_yields_empty_overlay() {
    assert!(store().get_all().await.is_empty());
  }

  #[tokio::test]
  async fn set_status_merges_and_overwrites() {
    let s = store();
    s.set_status("1", &UserStatus::Blacklisted).await;
    s.set_status("2", &UserStatus::Active).await;
    s.set_status("1", &UserStatus::Active).await;

    let overlay = s.get_all().await;
    assert_eq!(overlay.len(), 2);
    assert_eq!(overlay["1"], "active");
    assert_eq!(overlay["2"], "active");
  }

  #[tokio::test]
  async fn setting_same_status_twice_is_idempotent() {
    let s = store();
    s.set_status("7", &UserStatus::Pending).await;
    let once = s.get_all().await;
    s.set_status("7", &UserStatus::Pending).await;
    assert_eq!(s.get_all().await, once);
  }

  #[tokio::test]
  async fn malformed_overlay_json_degrades_to_empty() {
    let storage = MemoryStorage::new();
    storage
      .set_item(STATUS_KEY, "{not json".into())
      .await
      .unwrap();
    let s = StatusOverlayStore::new(storage);
    assert!(s.get_all().await.is_empty());

    // A write after corruption starts from a clean mapping.
    s.set_status("3", &UserStatus::Inactive).await;
    assert_eq!(s.get_all().await.get("3").map(String::as_str), Some("inactive"));
  }

  #[tokio::test]
  async fn corrupt_selected_user_reads_as_none() {
    let storage = MemoryStorage::new();
    storage
      .set_item(SELECTED_USER_KEY, "[]".into())
      .await
      .unwrap();
    assert!(StatusOverlayStore::new(storage).selected_user().await.is_none());
  }
}
