//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use roster_core::{
  LoadError,
  controller::{LoadState, UserListController},
  filter::{FilterField, FilterSpec},
  pagination::PAGE_SIZE_OPTIONS,
  user::{UserRecord, UserStatus},
};
use roster_store_sqlite::SqliteStorage;
use strum::{Display, EnumIter, IntoEnumIterator as _};
use tokio::sync::oneshot;

use crate::fixture::FixtureLocation;

pub type Controller = UserListController<FixtureLocation, SqliteStorage>;

type LoadResult = Result<Vec<UserRecord>, LoadError>;

/// Choices offered by the status field of the filter form. The empty string
/// means "any".
pub const STATUS_CHOICES: [&str; 5] = ["", "active", "inactive", "pending", "blacklisted"];

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Login,
  Users,
  UserDetail,
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginField {
  #[default]
  Email,
  Password,
}

#[derive(Debug, Default)]
pub struct LoginForm {
  pub email:         String,
  pub password:      String,
  pub focus:         LoginField,
  pub show_password: bool,
  pub error:         Option<String>,
}

impl LoginForm {
  fn focused_mut(&mut self) -> &mut String {
    match self.focus {
      LoginField::Email => &mut self.email,
      LoginField::Password => &mut self.password,
    }
  }
}

/// The credential pair the login screen accepts.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

// ─── Popups ───────────────────────────────────────────────────────────────────

/// Draft filter being edited; applied to the controller only on Enter.
#[derive(Debug, Clone)]
pub struct FilterForm {
  pub draft: FilterSpec,
  pub focus: FilterField,
}

impl FilterForm {
  fn new(applied: &FilterSpec) -> Self {
    Self { draft: applied.clone(), focus: FilterField::Organization }
  }

  fn move_focus(&mut self, forward: bool) {
    let fields: Vec<FilterField> = FilterField::iter().collect();
    self.focus = cycle(&fields, self.focus, forward);
  }
}

/// Row-level actions offered from the users table and the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum UserAction {
  #[strum(to_string = "View Details")]
  ViewDetails,
  #[strum(to_string = "Blacklist User")]
  Blacklist,
  #[strum(to_string = "Activate User")]
  Activate,
}

impl UserAction {
  /// The status this action sets, if it sets one.
  pub fn target_status(self) -> Option<UserStatus> {
    match self {
      Self::ViewDetails => None,
      Self::Blacklist => Some(UserStatus::Blacklisted),
      Self::Activate => Some(UserStatus::Active),
    }
  }

  /// A status action is disabled when the user already has that status.
  pub fn is_enabled_for(self, status: &UserStatus) -> bool {
    self.target_status().is_none_or(|target| &target != status)
  }
}

#[derive(Debug, Clone)]
pub struct ActionMenu {
  pub user_id: String,
  pub status:  UserStatus,
  pub cursor:  usize,
}

impl ActionMenu {
  pub fn selected(&self) -> UserAction {
    UserAction::iter().nth(self.cursor).unwrap_or(UserAction::ViewDetails)
  }
}

#[derive(Debug, Clone)]
pub enum Popup {
  Filter(FilterForm),
  Actions(ActionMenu),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Modal drawn over the users table, if any.
  pub popup: Option<Popup>,

  /// Owner of the user collection, filter and page position.
  pub controller: Controller,

  pub login: LoginForm,

  credentials: Credentials,

  /// Cursor within the rows of the current page.
  pub row_cursor: usize,

  /// Selected-user snapshot shown on the detail screen.
  pub detail: Option<UserRecord>,

  pub detail_scroll: u16,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Result channel of an in-flight background load.
  pending: Option<oneshot::Receiver<LoadResult>>,
}

impl App {
  pub fn new(controller: Controller, credentials: Credentials) -> Self {
    Self {
      screen: Screen::Login,
      popup: None,
      controller,
      login: LoginForm::default(),
      credentials,
      row_cursor: 0,
      detail: None,
      detail_scroll: 0,
      status_msg: String::new(),
      pending: None,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the users in the background. The UI keeps drawing the loading
  /// indicator until [`poll_load`](Self::poll_load) picks up the result.
  pub fn start_load(&mut self) {
    if self.pending.is_some() {
      return;
    }
    let directory = self.controller.directory().clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      tx.send(directory.load().await).ok();
    });

    self.controller.begin_load();
    self.pending = Some(rx);
    self.status_msg = "Loading users…".into();
  }

  /// Install the background load result if it has arrived.
  pub fn poll_load(&mut self) {
    let Some(rx) = self.pending.as_mut() else {
      return;
    };
    match rx.try_recv() {
      Ok(result) => {
        self.pending = None;
        self.finish_load(result);
      }
      Err(oneshot::error::TryRecvError::Empty) => {}
      Err(oneshot::error::TryRecvError::Closed) => {
        self.pending = None;
        self.finish_load(Err(LoadError::Unreachable(
          "load task ended without a result".into(),
        )));
      }
    }
  }

  pub fn is_loading(&self) -> bool { self.pending.is_some() }

  fn finish_load(&mut self, result: LoadResult) {
    self.controller.finish_load(result);
    self.row_cursor = 0;
    self.status_msg = match self.controller.state() {
      LoadState::Ready => format!("Loaded {} users", self.controller.total()),
      LoadState::Failed(e) => format!("Error: {e}"),
      LoadState::Idle | LoadState::Loading => String::new(),
    };
  }

  /// Await an in-flight load.
  #[cfg(test)]
  pub async fn settle_load(&mut self) {
    if let Some(rx) = self.pending.take() {
      let result = rx
        .await
        .unwrap_or_else(|_| Err(LoadError::Unreachable("load task dropped".into())));
      self.finish_load(result);
    }
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  /// The record under the row cursor on the current page.
  pub fn cursor_user(&self) -> Option<&UserRecord> {
    self.controller.current_page().rows.get(self.row_cursor).copied()
  }

  fn clamp_cursor(&mut self) {
    let rows = self.controller.current_page().rows.len();
    self.row_cursor = self.row_cursor.min(rows.saturating_sub(1));
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if let Some(popup) = self.popup.take() {
      return match popup {
        Popup::Filter(form) => self.handle_filter_key(form, key),
        Popup::Actions(menu) => self.handle_actions_key(menu, key).await,
      };
    }

    match self.screen {
      Screen::Login => self.handle_login_key(key),
      Screen::Users => self.handle_users_key(key).await,
      Screen::UserDetail => self.handle_detail_key(key).await,
    }
  }

  fn handle_login_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => return Ok(false),
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.login.focus = match self.login.focus {
          LoginField::Email => LoginField::Password,
          LoginField::Password => LoginField::Email,
        };
      }
      KeyCode::Char('t') if ctrl => {
        self.login.show_password = !self.login.show_password;
      }
      KeyCode::Enter => self.submit_login(),
      KeyCode::Backspace => {
        self.login.focused_mut().pop();
      }
      KeyCode::Char(c) => {
        self.login.focused_mut().push(c);
        self.login.error = None;
      }
      _ => {}
    }
    Ok(true)
  }

  fn submit_login(&mut self) {
    let email_ok = self.login.email.trim() == self.credentials.email;
    let password_ok = self.login.password == self.credentials.password;

    if !(email_ok && password_ok) {
      tracing::warn!(email = %self.login.email.trim(), "rejected login");
      self.login.error = Some("Invalid email or password".into());
      self.login.password.clear();
      return;
    }

    tracing::info!(email = %self.login.email.trim(), "logged in");
    self.login.password.clear();
    self.login.error = None;
    self.screen = Screen::Users;
    if *self.controller.state() == LoadState::Idle {
      self.start_load();
    }
  }

  async fn handle_users_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Char('r') if !self.controller.state().is_ready() => self.start_load(),
      _ if !self.controller.state().is_ready() => {}

      // Rows
      KeyCode::Down | KeyCode::Char('j') => {
        let rows = self.controller.current_page().rows.len();
        if self.row_cursor + 1 < rows {
          self.row_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.row_cursor = self.row_cursor.saturating_sub(1);
      }

      // Pages
      KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
        let next = self.controller.pagination().page() + 1;
        self.go_to_page(next);
      }
      KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
        let prev = self.controller.pagination().page().saturating_sub(1);
        self.go_to_page(prev);
      }
      KeyCode::Home | KeyCode::Char('g') => self.go_to_page(1),
      KeyCode::End | KeyCode::Char('G') => {
        let last = self.controller.total_pages();
        self.go_to_page(last);
      }
      KeyCode::Char('+') | KeyCode::Char(']') => self.step_page_size(true),
      KeyCode::Char('-') | KeyCode::Char('[') => self.step_page_size(false),

      // Filter
      KeyCode::Char('f') | KeyCode::Char('/') => {
        self.popup = Some(Popup::Filter(FilterForm::new(self.controller.applied_filter())));
      }
      KeyCode::Char('c') => {
        self.controller.clear_filter();
        self.row_cursor = 0;
        self.status_msg = "Filter cleared".into();
      }

      // Row actions
      KeyCode::Char('a') => {
        if let Some(user) = self.cursor_user() {
          self.popup = Some(Popup::Actions(ActionMenu {
            user_id: user.id.clone(),
            status:  user.status.clone(),
            cursor:  0,
          }));
        }
      }
      KeyCode::Enter => {
        if let Some(id) = self.cursor_user().map(|u| u.id.clone()) {
          self.open_detail(&id).await;
        }
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::Users;
        self.detail = None;
        self.detail_scroll = 0;
      }

      KeyCode::Down | KeyCode::Char('j') => {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      KeyCode::Char('b') => self.run_detail_action(UserAction::Blacklist).await,
      KeyCode::Char('a') => self.run_detail_action(UserAction::Activate).await,

      _ => {}
    }
    Ok(true)
  }

  fn handle_filter_key(&mut self, mut form: FilterForm, key: KeyEvent) -> anyhow::Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => return Ok(true),

      KeyCode::Enter => {
        self.controller.apply_filter(form.draft);
        self.row_cursor = 0;
        self.status_msg = format!("{} users match", self.controller.filtered_len());
        return Ok(true);
      }

      KeyCode::Char('u') if ctrl => {
        self.controller.clear_filter();
        self.row_cursor = 0;
        self.status_msg = "Filter cleared".into();
        return Ok(true);
      }

      KeyCode::Tab | KeyCode::Down => form.move_focus(true),
      KeyCode::BackTab | KeyCode::Up => form.move_focus(false),

      KeyCode::Left | KeyCode::Right => {
        let forward = key.code == KeyCode::Right;
        match form.focus {
          FilterField::Organization => {
            let mut choices = vec![""];
            choices.extend(self.controller.organizations());
            form.draft.organization = cycle_choice(&form.draft.organization, &choices, forward);
          }
          FilterField::Status => {
            form.draft.status = cycle_choice(&form.draft.status, &STATUS_CHOICES, forward);
          }
          _ => {}
        }
      }

      KeyCode::Backspace => {
        form.draft.get_mut(form.focus).pop();
      }
      KeyCode::Char(c) => form.draft.get_mut(form.focus).push(c),

      _ => {}
    }
    self.popup = Some(Popup::Filter(form));
    Ok(true)
  }

  async fn handle_actions_key(&mut self, mut menu: ActionMenu, key: KeyEvent) -> anyhow::Result<bool> {
    let count = UserAction::iter().count();
    match key.code {
      KeyCode::Esc => return Ok(true),
      KeyCode::Down | KeyCode::Char('j') => menu.cursor = (menu.cursor + 1) % count,
      KeyCode::Up | KeyCode::Char('k') => menu.cursor = (menu.cursor + count - 1) % count,
      KeyCode::Enter => {
        let action = menu.selected();
        if !action.is_enabled_for(&menu.status) {
          self.status_msg = format!("User is already {}", menu.status);
        } else {
          match action.target_status() {
            Some(status) => self.set_status(&menu.user_id, status).await,
            None => self.open_detail(&menu.user_id).await,
          }
          return Ok(true);
        }
      }
      _ => {}
    }
    self.popup = Some(Popup::Actions(menu));
    Ok(true)
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  fn go_to_page(&mut self, page: usize) {
    if self.controller.change_page(page) {
      self.row_cursor = 0;
    }
  }

  fn step_page_size(&mut self, forward: bool) {
    let current = self.controller.pagination().page_size();
    let next = cycle(&PAGE_SIZE_OPTIONS, current, forward);
    if self.controller.change_page_size(next) {
      self.row_cursor = 0;
      self.status_msg = format!("Showing {next} per page");
    }
  }

  /// Persist `id` as the selected user and show its snapshot.
  async fn open_detail(&mut self, id: &str) {
    if self.controller.select_user(id).await.is_none() {
      return;
    }
    self.detail = match self.controller.selected_user().await {
      Some(snapshot) => Some(snapshot),
      None => self.controller.find(id).cloned(),
    };
    self.detail_scroll = 0;
    self.screen = Screen::UserDetail;
  }

  async fn run_detail_action(&mut self, action: UserAction) {
    let Some((id, status)) = self.detail.as_ref().map(|u| (u.id.clone(), u.status.clone())) else {
      return;
    };
    let Some(target) = action.target_status() else {
      return;
    };
    if !action.is_enabled_for(&status) {
      self.status_msg = format!("User is already {status}");
      return;
    }
    self.set_status(&id, target).await;
  }

  async fn set_status(&mut self, id: &str, status: UserStatus) {
    if !self.controller.update_status(id, status.clone()).await {
      self.status_msg = format!("No user with id {id}");
      return;
    }
    self.status_msg = format!("User {id} is now {status}");
    self.clamp_cursor();

    if let Some(detail) = self.detail.as_mut()
      && detail.id == id
    {
      detail.status = status;
    }
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Step through `items` from `current`, wrapping at both ends. Starts at the
/// first item when `current` is not in the list.
fn cycle<T: Copy + PartialEq>(items: &[T], current: T, forward: bool) -> T {
  let len = items.len();
  let next = match items.iter().position(|i| *i == current) {
    Some(p) if forward => (p + 1) % len,
    Some(p) => (p + len - 1) % len,
    None => 0,
  };
  items[next]
}

/// Like [`cycle`] over display strings, matching `current` ignoring case.
fn cycle_choice(current: &str, choices: &[&str], forward: bool) -> String {
  let len = choices.len();
  let next = match choices.iter().position(|c| c.eq_ignore_ascii_case(current.trim())) {
    Some(p) if forward => (p + 1) % len,
    Some(p) => (p + len - 1) % len,
    None => 0,
  };
  choices.get(next).copied().unwrap_or_default().to_owned()
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use roster_core::{directory::UserDirectory, overlay::StatusOverlayStore};
  use serde_json::json;
  use uuid::Uuid;

  use super::*;

  const EMAIL: &str = "admin@roster.dev";
  const PASSWORD: &str = "letmein";

  async fn write_fixture(users: serde_json::Value) -> PathBuf {
    let path = std::env::temp_dir().join(format!("roster-app-{}.json", Uuid::new_v4()));
    tokio::fs::write(&path, json!({ "users": users }).to_string())
      .await
      .unwrap();
    path
  }

  async fn app_at(path: PathBuf) -> App {
    let storage = SqliteStorage::open_in_memory().await.unwrap();
    let directory = UserDirectory::new(FixtureLocation::File(path), StatusOverlayStore::new(storage));
    App::new(
      UserListController::new(directory, 10),
      Credentials { email: EMAIL.into(), password: PASSWORD.into() },
    )
  }

  fn users() -> serde_json::Value {
    (1..=12)
      .map(|i| {
        json!({
          "id": i.to_string(),
          "organization": if i % 2 == 0 { "Lendsqr" } else { "Irorun" },
          "username": format!("user{i}"),
          "status": "Pending",
          "personalInformation": { "fullName": if i == 3 { "Ada Obi" } else { "" } }
        })
      })
      .collect()
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  async fn press(app: &mut App, code: KeyCode) {
    assert!(app.handle_key(key(code)).await.unwrap());
  }

  async fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
      press(app, KeyCode::Char(c)).await;
    }
  }

  async fn logged_in(path: PathBuf) -> App {
    let mut app = app_at(path).await;
    type_text(&mut app, EMAIL).await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, PASSWORD).await;
    press(&mut app, KeyCode::Enter).await;
    app.settle_load().await;
    app
  }

  #[tokio::test]
  async fn wrong_password_stays_on_login() {
    let path = write_fixture(users()).await;
    let mut app = app_at(path.clone()).await;

    type_text(&mut app, EMAIL).await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "nope").await;
    press(&mut app, KeyCode::Enter).await;

    assert_eq!(app.screen, Screen::Login);
    assert!(app.login.error.is_some());
    assert!(app.login.password.is_empty());
    assert_eq!(app.controller.state(), &LoadState::Idle);

    tokio::fs::remove_file(&path).await.ok();
  }

  #[tokio::test]
  async fn login_loads_users() {
    let path = write_fixture(users()).await;
    let app = logged_in(path.clone()).await;

    assert_eq!(app.screen, Screen::Users);
    assert!(app.controller.state().is_ready());
    assert_eq!(app.controller.total(), 12);
    assert_eq!(app.controller.current_page().rows.len(), 10);

    tokio::fs::remove_file(&path).await.ok();
  }

  #[tokio::test]
  async fn filter_popup_applies_on_enter() {
    let path = write_fixture(users()).await;
    let mut app = logged_in(path.clone()).await;

    press(&mut app, KeyCode::Char('f')).await;
    press(&mut app, KeyCode::Right).await;
    let Some(Popup::Filter(form)) = &app.popup else {
      panic!("filter popup should be open");
    };
    assert_eq!(form.draft.organization, "Irorun");

    press(&mut app, KeyCode::Enter).await;
    assert!(app.popup.is_none());
    assert_eq!(app.controller.filtered_len(), 6);

    press(&mut app, KeyCode::Char('c')).await;
    assert_eq!(app.controller.filtered_len(), 12);

    tokio::fs::remove_file(&path).await.ok();
  }

  #[tokio::test]
  async fn username_filter_uses_full_name() {
    let path = write_fixture(users()).await;
    let mut app = logged_in(path.clone()).await;

    press(&mut app, KeyCode::Char('f')).await;
    press(&mut app, KeyCode::Down).await;
    type_text(&mut app, "ADA").await;
    press(&mut app, KeyCode::Enter).await;

    let ids: Vec<&str> = app.controller.filtered_view().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, ["3"]);

    tokio::fs::remove_file(&path).await.ok();
  }

  #[tokio::test]
  async fn action_menu_blacklists_and_then_disables() {
    let path = write_fixture(users()).await;
    let mut app = logged_in(path.clone()).await;

    press(&mut app, KeyCode::Char('a')).await;
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Enter).await;

    assert!(app.popup.is_none());
    assert_eq!(app.controller.find("1").unwrap().status, UserStatus::Blacklisted);
    let overlay = app.controller.directory().overlay().get_all().await;
    assert_eq!(overlay.get("1").map(String::as_str), Some("blacklisted"));

    press(&mut app, KeyCode::Char('a')).await;
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Enter).await;
    assert!(matches!(app.popup, Some(Popup::Actions(_))));
    assert!(app.status_msg.contains("already"));

    tokio::fs::remove_file(&path).await.ok();
  }

  #[tokio::test]
  async fn paging_and_page_size() {
    let path = write_fixture(users()).await;
    let mut app = logged_in(path.clone()).await;

    press(&mut app, KeyCode::Char('n')).await;
    assert_eq!(app.controller.pagination().page(), 2);
    assert_eq!(app.cursor_user().map(|u| u.id.as_str()), Some("11"));

    // Past the last page is ignored.
    press(&mut app, KeyCode::Char('n')).await;
    assert_eq!(app.controller.pagination().page(), 2);

    press(&mut app, KeyCode::Char('+')).await;
    assert_eq!(app.controller.pagination().page_size(), 50);
    assert_eq!(app.controller.pagination().page(), 1);

    press(&mut app, KeyCode::Char('-')).await;
    press(&mut app, KeyCode::Char('-')).await;
    assert_eq!(app.controller.pagination().page_size(), 500);

    tokio::fs::remove_file(&path).await.ok();
  }

  #[tokio::test]
  async fn detail_screen_shows_snapshot_and_updates_status() {
    let path = write_fixture(users()).await;
    let mut app = logged_in(path.clone()).await;

    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.screen, Screen::UserDetail);
    assert_eq!(app.detail.as_ref().map(|u| u.id.as_str()), Some("2"));

    press(&mut app, KeyCode::Char('a')).await;
    assert_eq!(app.detail.as_ref().unwrap().status, UserStatus::Active);
    let snapshot = app.controller.selected_user().await.unwrap();
    assert_eq!(snapshot.status, UserStatus::Active);

    press(&mut app, KeyCode::Char('a')).await;
    assert!(app.status_msg.contains("already"));

    press(&mut app, KeyCode::Esc).await;
    assert_eq!(app.screen, Screen::Users);

    tokio::fs::remove_file(&path).await.ok();
  }

  #[tokio::test]
  async fn failed_load_can_be_retried() {
    let path = std::env::temp_dir().join(format!("roster-app-{}.json", Uuid::new_v4()));
    let mut app = logged_in(path.clone()).await;
    assert!(matches!(app.controller.state(), LoadState::Failed(_)));
    assert!(app.status_msg.starts_with("Error"));

    tokio::fs::write(&path, json!({ "users": users() }).to_string())
      .await
      .unwrap();
    press(&mut app, KeyCode::Char('r')).await;
    assert!(app.is_loading());
    app.settle_load().await;
    assert!(app.controller.state().is_ready());

    tokio::fs::remove_file(&path).await.ok();
  }

  #[tokio::test]
  async fn q_quits() {
    let path = write_fixture(users()).await;
    let mut app = logged_in(path.clone()).await;
    assert!(!app.handle_key(key(KeyCode::Char('q'))).await.unwrap());
    tokio::fs::remove_file(&path).await.ok();
  }

  #[test]
  fn cycling_wraps() {
    assert_eq!(cycle(&[1, 2, 3], 3, true), 1);
    assert_eq!(cycle(&[1, 2, 3], 1, false), 3);
    assert_eq!(cycle_choice("ACTIVE", &STATUS_CHOICES, true), "inactive");
    assert_eq!(cycle_choice("bogus", &STATUS_CHOICES, true), "");
  }

  #[test]
  fn organization_choices_walk_the_whole_ring() {
    let choices = ["", "Irorun", "Lendsqr"];
    let mut current = String::new();
    let mut seen = Vec::new();
    for _ in 0..6 {
      current = cycle_choice(&current, &choices, true);
      seen.push(current.clone());
    }
    assert_eq!(seen, ["Irorun", "Lendsqr", "", "Irorun", "Lendsqr", ""]);
  }

  #[tokio::test]
  async fn organization_field_cycles_back_to_any() {
    let path = write_fixture(json!([
      { "id": "1", "organization": "Lendsqr" },
      { "id": "2", "organization": "LENDSQR" },
      { "id": "3", "organization": "Lendsqr" },
      { "id": "4", "organization": "Irorun" }
    ]))
    .await;
    let mut app = logged_in(path.clone()).await;

    press(&mut app, KeyCode::Char('f')).await;
    let mut seen = Vec::new();
    for _ in 0..3 {
      press(&mut app, KeyCode::Right).await;
      let Some(Popup::Filter(form)) = &app.popup else {
        panic!("filter popup should be open");
      };
      seen.push(form.draft.organization.clone());
    }
    assert_eq!(seen, ["Irorun", "Lendsqr", ""]);

    press(&mut app, KeyCode::Left).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.controller.filtered_len(), 3);

    tokio::fs::remove_file(&path).await.ok();
  }

  #[test]
  fn status_actions_disable_for_current_status() {
    assert!(!UserAction::Blacklist.is_enabled_for(&UserStatus::Blacklisted));
    assert!(UserAction::Activate.is_enabled_for(&UserStatus::Blacklisted));
    assert!(UserAction::ViewDetails.is_enabled_for(&UserStatus::Active));
  }
}
