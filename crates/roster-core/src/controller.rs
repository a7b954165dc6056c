//! The user-list controller: the single owner of dashboard state.
//!
//! Holds the canonical collection, the applied filter, the derived filtered
//! view and the page position. Views read from it and call its operations;
//! nothing else mutates user state.
//!
//! Status edits write through the overlay store first and then update the
//! in-memory record, so the persisted overlay and the canonical collection
//! never diverge.

use crate::{
  LoadError,
  directory::{FixtureSource, UserDirectory},
  filter::{FilterSpec, matches},
  overlay::KeyValueStorage,
  pagination::{Page, Pagination, total_pages},
  user::{UserRecord, UserStatus},
};

// ─── Load state ──────────────────────────────────────────────────────────────

/// Lifecycle of the canonical collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
  /// Nothing requested yet.
  #[default]
  Idle,
  /// A fixture fetch is in flight.
  Loading,
  /// The canonical collection is available.
  Ready,
  /// The last load failed; no data is shown until a retry succeeds.
  Failed(String),
}

impl LoadState {
  pub fn is_ready(&self) -> bool { matches!(self, Self::Ready) }
}

// ─── Page view ───────────────────────────────────────────────────────────────

/// What the table renders: the current page of the filtered view plus the
/// numbers around it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
  pub rows:           Vec<&'a UserRecord>,
  pub page:           usize,
  pub page_size:      usize,
  pub total_pages:    usize,
  /// Length of the filtered view.
  pub filtered_total: usize,
}

// ─── Controller ──────────────────────────────────────────────────────────────

pub struct UserListController<F, S> {
  directory:  UserDirectory<F, S>,
  state:      LoadState,
  canonical:  Vec<UserRecord>,
  filter:     FilterSpec,
  /// Indices into `canonical`, in collection order.
  filtered:   Vec<usize>,
  pagination: Pagination,
}

impl<F: FixtureSource, S: KeyValueStorage> UserListController<F, S> {
  pub fn new(directory: UserDirectory<F, S>, page_size: usize) -> Self {
    Self {
      directory,
      state: LoadState::Idle,
      canonical: Vec::new(),
      filter: FilterSpec::default(),
      filtered: Vec::new(),
      pagination: Pagination::new(page_size),
    }
  }

  pub fn directory(&self) -> &UserDirectory<F, S> { &self.directory }

  pub fn state(&self) -> &LoadState { &self.state }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// Enter the `Loading` state. The fetch itself is driven by the caller
  /// (typically a spawned [`UserDirectory::load`]) and reported back through
  /// [`finish_load`](Self::finish_load).
  pub fn begin_load(&mut self) {
    self.state = LoadState::Loading;
  }

  /// Install the outcome of a load. On failure the canonical collection is
  /// cleared so no stale data is shown.
  pub fn finish_load(&mut self, result: Result<Vec<UserRecord>, LoadError>) {
    match result {
      Ok(users) => {
        self.canonical = users;
        self.state = LoadState::Ready;
        self.recompute();
        self.pagination.reset();
      }
      Err(e) => {
        tracing::error!(error = %e, "loading users failed");
        self.canonical.clear();
        self.filtered.clear();
        self.pagination.reset();
        self.state = LoadState::Failed(e.to_string());
      }
    }
  }

  /// Load in place: `begin_load`, fetch, `finish_load`.
  pub async fn load(&mut self) {
    self.begin_load();
    let result = self.directory.load().await;
    self.finish_load(result);
  }

  // ── Filtering ─────────────────────────────────────────────────────────────

  pub fn applied_filter(&self) -> &FilterSpec { &self.filter }

  /// Replace the applied filter and go back to page 1.
  pub fn apply_filter(&mut self, spec: FilterSpec) {
    if !self.ready("apply_filter") {
      return;
    }
    self.filter = spec;
    self.recompute();
    self.pagination.reset();
    tracing::debug!(matched = self.filtered.len(), "filter applied");
  }

  /// Drop every constraint; the filtered view becomes the whole collection.
  pub fn clear_filter(&mut self) {
    if !self.ready("clear_filter") {
      return;
    }
    self.filter = FilterSpec::default();
    self.recompute();
    self.pagination.reset();
  }

  /// The filtered view, in canonical order.
  pub fn filtered_view(&self) -> impl Iterator<Item = &UserRecord> + '_ {
    self.filtered.iter().map(|&i| &self.canonical[i])
  }

  pub fn filtered_len(&self) -> usize { self.filtered.len() }

  // ── Status ────────────────────────────────────────────────────────────────

  /// Persist `status` for `id`, update the in-memory record and re-evaluate
  /// the current filter (the record may enter or leave the view).
  ///
  /// Returns `false` when nothing is loaded or no record has that id.
  pub async fn update_status(&mut self, id: &str, status: UserStatus) -> bool {
    if !self.ready("update_status") {
      return false;
    }
    let Some(record) = self.canonical.iter_mut().find(|u| u.id == id) else {
      tracing::warn!(id, "status change for unknown user");
      return false;
    };

    self.directory.overlay().set_status(id, &status).await;
    record.status = status.clone();

    let overlay = self.directory.overlay();
    if let Some(mut snapshot) = overlay.selected_user().await
      && snapshot.id == id
    {
      snapshot.status = status.clone();
      overlay.set_selected_user(&snapshot).await;
    }

    self.recompute();
    self.pagination.clamp(self.filtered.len());
    tracing::info!(id, %status, visible = self.filtered.len(), "status updated");
    true
  }

  // ── Pagination ────────────────────────────────────────────────────────────

  pub fn pagination(&self) -> &Pagination { &self.pagination }

  pub fn total_pages(&self) -> usize {
    total_pages(self.filtered.len(), self.pagination.page_size())
  }

  /// Go to page `n`; ignored (returns `false`) when out of range.
  pub fn change_page(&mut self, n: usize) -> bool {
    self.ready("change_page") && self.pagination.change_page(n, self.filtered.len())
  }

  /// Change page size; always lands on page 1.
  pub fn change_page_size(&mut self, page_size: usize) -> bool {
    self.ready("change_page_size") && self.pagination.change_page_size(page_size)
  }

  /// The current page of the filtered view.
  pub fn current_page(&self) -> PageView<'_> {
    let Page { slice, total_pages } = self.pagination.slice(&self.filtered);
    PageView {
      rows: slice.iter().map(|&i| &self.canonical[i]).collect(),
      page: self.pagination.page(),
      page_size: self.pagination.page_size(),
      total_pages,
      filtered_total: self.filtered.len(),
    }
  }

  // ── Directory queries ─────────────────────────────────────────────────────

  pub fn total(&self) -> usize { self.canonical.len() }

  pub fn find(&self, id: &str) -> Option<&UserRecord> {
    self.canonical.iter().find(|u| u.id == id)
  }

  /// Distinct organizations in the canonical collection, sorted and
  /// deduplicated ignoring case. The first spelling seen is kept.
  pub fn organizations(&self) -> Vec<&str> {
    let mut orgs: Vec<&str> = self.canonical.iter().map(|u| u.organization.as_str()).collect();
    orgs.sort_by_key(|o| o.to_lowercase());
    orgs.dedup_by_key(|o| o.to_lowercase());
    orgs
  }

  /// Remember `id` as the selected user (persisted snapshot). Returns the
  /// record, or `None` if no such user is loaded.
  pub async fn select_user(&self, id: &str) -> Option<&UserRecord> {
    if !self.state.is_ready() {
      return None;
    }
    let record = self.find(id)?;
    self.directory.overlay().set_selected_user(record).await;
    Some(record)
  }

  /// The persisted selected-user snapshot.
  pub async fn selected_user(&self) -> Option<UserRecord> {
    self.directory.overlay().selected_user().await
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  fn ready(&self, op: &'static str) -> bool {
    let ready = self.state.is_ready();
    if !ready {
      tracing::debug!(op, state = ?self.state, "ignored until users are loaded");
    }
    ready
  }

  fn recompute(&mut self) {
    self.filtered = if self.filter.is_empty() {
      (0..self.canonical.len()).collect()
    } else {
      self
        .canonical
        .iter()
        .enumerate()
        .filter(|(_, u)| matches(u, &self.filter))
        .map(|(i, _)| i)
        .collect()
    };
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{
    directory::test_helpers::StaticFixture,
    filter::FilterField,
    overlay::{MemoryStorage, StatusOverlayStore},
  };

  type Controller = UserListController<StaticFixture, MemoryStorage>;

  fn controller_with(storage: MemoryStorage, users: serde_json::Value) -> Controller {
    let directory = UserDirectory::new(
      StaticFixture::json(json!({ "users": users })),
      StatusOverlayStore::new(storage),
    );
    UserListController::new(directory, 10)
  }

  fn three_users() -> serde_json::Value {
    json!([
      { "id": "1", "status": "Active",  "organization": "Lendsqr" },
      { "id": "2", "status": "Pending", "organization": "Irorun" },
      { "id": "3",                      "organization": "lendstar" }
    ])
  }

  fn many_users(n: usize) -> serde_json::Value {
    (1..=n)
      .map(|i| json!({ "id": i.to_string(), "status": if i % 2 == 0 { "active" } else { "inactive" } }))
      .collect()
  }

  fn ids(c: &Controller) -> Vec<&str> { c.filtered_view().map(|u| u.id.as_str()).collect() }

  #[tokio::test]
  async fn operations_are_no_ops_before_load() {
    let mut c = controller_with(MemoryStorage::new(), three_users());
    assert_eq!(c.state(), &LoadState::Idle);

    c.apply_filter(FilterSpec::default().with(FilterField::Status, "active"));
    assert!(c.applied_filter().is_empty());
    assert!(!c.change_page(1));
    assert!(!c.update_status("1", UserStatus::Blacklisted).await);
    assert!(c.directory().overlay().get_all().await.is_empty());
  }

  #[tokio::test]
  async fn empty_filter_is_identity() {
    let mut c = controller_with(MemoryStorage::new(), three_users());
    c.load().await;
    assert!(c.state().is_ready());
    assert_eq!(ids(&c), ["1", "2", "3"]);

    c.apply_filter(FilterSpec::default().with(FilterField::Username, "  "));
    assert_eq!(ids(&c), ["1", "2", "3"]);
  }

  #[tokio::test]
  async fn status_edit_moves_record_into_filtered_view() {
    let mut c = controller_with(MemoryStorage::new(), three_users());
    c.load().await;

    c.apply_filter(FilterSpec::default().with(FilterField::Status, "active"));
    assert_eq!(ids(&c), ["1"]);

    assert!(c.update_status("2", UserStatus::Active).await);
    assert_eq!(ids(&c), ["1", "2"]);
  }

  #[tokio::test]
  async fn status_edit_moves_record_out_of_filtered_view() {
    let mut c = controller_with(MemoryStorage::new(), three_users());
    c.load().await;

    c.apply_filter(FilterSpec::default().with(FilterField::Status, "active"));
    assert!(c.update_status("1", UserStatus::Blacklisted).await);
    assert_eq!(ids(&c), Vec::<&str>::new());
    assert_eq!(c.find("1").unwrap().status, UserStatus::Blacklisted);
  }

  #[tokio::test]
  async fn status_survives_reload() {
    let storage = MemoryStorage::new();
    let mut c = controller_with(storage.clone(), three_users());
    c.load().await;
    assert!(c.update_status("3", UserStatus::Blacklisted).await);

    let overlay = c.directory().overlay().get_all().await;
    assert_eq!(overlay.get("3").map(String::as_str), Some("blacklisted"));

    let mut reloaded = controller_with(storage, three_users());
    reloaded.load().await;
    assert_eq!(reloaded.find("3").unwrap().status, UserStatus::Blacklisted);
  }

  #[tokio::test]
  async fn update_status_for_unknown_id_changes_nothing() {
    let mut c = controller_with(MemoryStorage::new(), three_users());
    c.load().await;
    assert!(!c.update_status("99", UserStatus::Active).await);
    assert!(c.directory().overlay().get_all().await.is_empty());
  }

  #[tokio::test]
  async fn clear_filter_restores_collection() {
    let mut c = controller_with(MemoryStorage::new(), three_users());
    c.load().await;
    c.apply_filter(FilterSpec::default().with(FilterField::Organization, "IRORUN"));
    assert_eq!(ids(&c), ["2"]);

    c.clear_filter();
    assert!(c.applied_filter().is_empty());
    assert_eq!(ids(&c), ["1", "2", "3"]);
  }

  #[tokio::test]
  async fn filter_resets_page() {
    let mut c = controller_with(MemoryStorage::new(), many_users(25));
    c.load().await;
    assert!(c.change_page(3));

    c.apply_filter(FilterSpec::default().with(FilterField::Status, "active"));
    assert_eq!(c.pagination().page(), 1);
    assert_eq!(c.filtered_len(), 12);
  }

  #[tokio::test]
  async fn pages_of_the_filtered_view() {
    let mut c = controller_with(MemoryStorage::new(), many_users(25));
    c.load().await;

    let page = c.current_page();
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.rows.first().unwrap().id, "1");
    assert_eq!(page.rows.len(), 10);

    assert!(c.change_page(3));
    let page = c.current_page();
    let page_ids: Vec<&str> = page.rows.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(page_ids, ["21", "22", "23", "24", "25"]);

    assert!(!c.change_page(4));
    assert!(c.change_page_size(50));
    assert_eq!(c.pagination().page(), 1);
    assert_eq!(c.total_pages(), 1);
  }

  #[tokio::test]
  async fn page_is_clamped_when_status_edit_shrinks_view() {
    let mut c = controller_with(MemoryStorage::new(), many_users(22));
    c.load().await;
    c.apply_filter(FilterSpec::default().with(FilterField::Status, "active"));
    assert_eq!(c.filtered_len(), 11);
    assert!(c.change_page(2));

    assert!(c.update_status("22", UserStatus::Blacklisted).await);
    assert_eq!(c.filtered_len(), 10);
    assert_eq!(c.pagination().page(), 1);
    assert_eq!(c.current_page().rows.len(), 10);
  }

  #[tokio::test]
  async fn failed_load_shows_no_data() {
    let directory = UserDirectory::new(
      StaticFixture(Err(500)),
      StatusOverlayStore::new(MemoryStorage::new()),
    );
    let mut c = UserListController::new(directory, 10);
    c.load().await;

    assert!(matches!(c.state(), LoadState::Failed(_)));
    assert_eq!(c.total(), 0);
    assert_eq!(c.current_page().total_pages, 1);
  }

  #[tokio::test]
  async fn selected_snapshot_follows_status_edits() {
    let mut c = controller_with(MemoryStorage::new(), three_users());
    c.load().await;

    assert_eq!(c.select_user("2").await.map(|u| u.id.as_str()), Some("2"));
    assert!(c.update_status("2", UserStatus::Blacklisted).await);

    let snapshot = c.selected_user().await.unwrap();
    assert_eq!(snapshot.id, "2");
    assert_eq!(snapshot.status, UserStatus::Blacklisted);

    // Editing someone else leaves the snapshot alone.
    assert!(c.update_status("1", UserStatus::Inactive).await);
    assert_eq!(c.selected_user().await.unwrap().id, "2");
  }

  #[tokio::test]
  async fn organizations_are_distinct_and_sorted() {
    let mut c = controller_with(
      MemoryStorage::new(),
      json!([
        { "organization": "Lendsqr" },
        { "organization": "irorun" },
        { "organization": "Lendsqr" },
        {}
      ]),
    );
    c.load().await;
    assert_eq!(c.organizations(), ["irorun", "Lendsqr", "Unknown"]);
  }

  #[tokio::test]
  async fn organizations_collapse_case_variants() {
    let mut c = controller_with(
      MemoryStorage::new(),
      json!([
        { "organization": "Lendsqr" },
        { "organization": "LENDSQR" },
        { "organization": "Lendsqr" },
        { "organization": "Irorun" }
      ]),
    );
    c.load().await;
    assert_eq!(c.organizations(), ["Irorun", "Lendsqr"]);
  }
}
