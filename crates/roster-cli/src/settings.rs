//! Runtime settings: defaults, then an optional TOML file, then `ROSTER_*`
//! environment variables. Command-line flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use chrono::FixedOffset;
use roster_core::pagination::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Path or `http(s)://` URL of the users fixture.
  pub fixture:            String,
  /// SQLite file holding the status overlay.
  pub store_path:         PathBuf,
  /// Credential pair accepted by the login screen.
  pub login_email:        String,
  pub login_password:     String,
  pub page_size:          usize,
  /// Offset applied when rendering join dates.
  pub utc_offset_minutes: i32,
  pub log_file:           PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      fixture:            "data/users.json".into(),
      store_path:         PathBuf::from("~/.local/share/roster/roster.db"),
      login_email:        "admin@roster.dev".into(),
      login_password:     "roster".into(),
      page_size:          DEFAULT_PAGE_SIZE,
      utc_offset_minutes: 0,
      log_file:           PathBuf::from("roster.log"),
    }
  }
}

impl Settings {
  /// Layer the optional config file and the environment over the defaults.
  pub fn load(config_path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(config_path).required(false))
      .add_source(config::Environment::with_prefix("ROSTER"))
      .build()
      .with_context(|| format!("reading config {}", config_path.display()))?;

    settings
      .try_deserialize()
      .context("deserialising settings")
  }

  /// Reject values the dashboard cannot work with.
  pub fn validate(&self) -> anyhow::Result<()> {
    if !PAGE_SIZE_OPTIONS.contains(&self.page_size) {
      bail!(
        "page_size {} is not one of {:?}",
        self.page_size,
        PAGE_SIZE_OPTIONS
      );
    }
    if self.utc_offset().is_none() {
      bail!("utc_offset_minutes {} is out of range", self.utc_offset_minutes);
    }
    Ok(())
  }

  pub fn utc_offset(&self) -> Option<FixedOffset> {
    FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    Settings::default().validate().unwrap();
  }

  #[test]
  fn page_size_must_be_a_preset() {
    let settings = Settings { page_size: 7, ..Settings::default() };
    assert!(settings.validate().is_err());
  }

  #[test]
  fn offset_is_bounded() {
    let settings = Settings { utc_offset_minutes: 60, ..Settings::default() };
    assert_eq!(settings.utc_offset().map(|o| o.local_minus_utc()), Some(3600));

    let settings = Settings { utc_offset_minutes: 24 * 60, ..Settings::default() };
    assert!(settings.validate().is_err());
  }

  #[test]
  fn missing_config_file_yields_defaults() {
    let settings = Settings::load(Path::new("/definitely/not/here/roster.toml")).unwrap();
    assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
  }
}
