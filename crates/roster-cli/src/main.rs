//! `roster`: terminal dashboard for browsing, filtering and moderating users.
//!
//! # Usage
//!
//! ```
//! roster --fixture data/users.json
//! roster --config roster.toml --page-size 50
//! roster --fixture https://example.com/users.json --ephemeral
//! ```

mod app;
mod fixture;
mod settings;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::{App, Credentials};
use clap::Parser;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use fixture::FixtureLocation;
use ratatui::{Terminal, backend::CrosstermBackend};
use roster_core::{controller::UserListController, directory::UserDirectory, overlay::StatusOverlayStore};
use roster_store_sqlite::SqliteStorage;
use settings::Settings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Terminal dashboard for the user directory")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "roster.toml")]
  config: PathBuf,

  /// Users fixture: a JSON file path or an http(s) URL.
  #[arg(long)]
  fixture: Option<String>,

  /// SQLite file holding status overrides.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Rows per page (10, 50, 100, … 500).
  #[arg(long)]
  page_size: Option<usize>,

  /// Keep status overrides in memory only.
  #[arg(long)]
  ephemeral: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // CLI flags override the config file, which overrides defaults.
  let mut settings = Settings::load(&args.config)?;
  if let Some(fixture) = args.fixture {
    settings.fixture = fixture;
  }
  if let Some(store) = args.store {
    settings.store_path = store;
  }
  if let Some(page_size) = args.page_size {
    settings.page_size = page_size;
  }
  settings.validate()?;

  let _log_guard = init_logging(&settings)?;
  tracing::info!(fixture = %settings.fixture, "starting roster");

  let storage = if args.ephemeral {
    SqliteStorage::open_in_memory()
      .await
      .context("opening in-memory store")?
  } else {
    let path = settings::expand_tilde(&settings.store_path);
    SqliteStorage::open(&path)
      .await
      .with_context(|| format!("opening store {}", path.display()))?
  };

  let source = FixtureLocation::parse(&settings.fixture)?;
  tracing::debug!(source = %source.describe(), "fixture source");

  let mut directory = UserDirectory::new(source, StatusOverlayStore::new(storage));
  if let Some(offset) = settings.utc_offset() {
    directory = directory.with_offset(offset);
  }
  let controller = UserListController::new(directory, settings.page_size);
  let mut app = App::new(controller, Credentials {
    email:    settings.login_email.clone(),
    password: settings.login_password.clone(),
  });

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  if let Err(e) = &run_result {
    tracing::error!(error = %e, "roster exited with an error");
  }
  run_result
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(settings: &Settings) -> Result<WorkerGuard> {
  let path = settings::expand_tilde(&settings.log_file);
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating log directory {}", parent.display()))?;
  }
  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&path)
    .with_context(|| format!("opening log file {}", path.display()))?;
  let (writer, guard) = tracing_appender::non_blocking(file);

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.poll_load();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
