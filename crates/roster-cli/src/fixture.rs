//! Fixture transport: a local JSON file or an HTTP(S) endpoint.

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use reqwest::Client;
use roster_core::{LoadError, directory::FixtureSource};

/// Where the users document is read from.
pub enum FixtureLocation {
  File(PathBuf),
  Http { client: Client, url: String },
}

impl FixtureLocation {
  /// `http://` and `https://` locations are fetched over the network,
  /// anything else is a file path.
  pub fn parse(location: &str) -> anyhow::Result<Self> {
    if location.starts_with("http://") || location.starts_with("https://") {
      let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;
      Ok(Self::Http { client, url: location.to_owned() })
    } else {
      Ok(Self::File(PathBuf::from(location)))
    }
  }

  pub fn describe(&self) -> String {
    match self {
      Self::File(path) => path.display().to_string(),
      Self::Http { url, .. } => url.clone(),
    }
  }
}

impl FixtureSource for FixtureLocation {
  async fn fetch(&self) -> Result<String, LoadError> {
    match self {
      Self::File(path) => tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoadError::Unreachable(format!("{}: {e}", path.display()))),

      Self::Http { client, url } => {
        let resp = client
          .get(url)
          .send()
          .await
          .map_err(|e| LoadError::Unreachable(e.to_string()))?;

        if !resp.status().is_success() {
          return Err(LoadError::Status(resp.status().as_u16()));
        }
        resp
          .text()
          .await
          .map_err(|e| LoadError::Unreachable(e.to_string()))
      }
    }
  }
}
