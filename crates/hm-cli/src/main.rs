//! `hm`: terminal client for HM.
//!
//! # Usage
//!
//! ```
//! hm --url http://localhost:8000
//! hm --url http://localhost:8000 --auth-code CODE --person 3f2a…
//! hm --config ~/.config/hm/config.toml --log-file /tmp/hm.log
//! ```
//!
//! Without `--auth-code` the terminal has no way to obtain a grant, so only
//! a server in mock identity mode will let the session start.

mod app;
mod form;
mod host;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use hm_client::HttpBackend;
use hm_sync::{bootstrap::Bootstrap, navigation::Route, session::SessionCell, shell::NavigationShell};
use host::TerminalHost;
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_appender::{
  non_blocking::{NonBlocking, WorkerGuard},
  rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "hm", about = "Terminal client for HM")]
struct Args {
  /// Path to a TOML config file (url, log_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the HM server (default: http://localhost:8000).
  #[arg(long, env = "HM_URL")]
  url: Option<String>,

  /// Authorization code issued by the host, used for the handshake.
  #[arg(long, env = "HM_AUTH_CODE")]
  auth_code: Option<String>,

  /// Open straight onto this person's profile.
  #[arg(long, value_name = "ID")]
  person: Option<String>,

  /// Append logs to this file. Logging is off otherwise.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      Option<String>,
  #[serde(default)]
  log_file: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  // The guard flushes buffered log lines when main returns.
  let _log_guard = args
    .log_file
    .as_deref()
    .or(file_cfg.log_file.as_deref())
    .map(init_logging)
    .transpose()?;
  let base_url = args
    .url
    .or(file_cfg.url)
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let entry = entry_route(args.person.as_deref())?;

  let backend = Arc::new(HttpBackend::new(&base_url).context("building http client")?);
  let session = SessionCell::new();
  let shell = NavigationShell::new(backend.clone(), session.clone(), entry);
  let bootstrap = Bootstrap::new(backend, TerminalHost::capability(args.auth_code), session);
  tracing::info!(%base_url, "starting bootstrap");
  let mut app = App::new(shell, tokio::spawn(bootstrap.run()));

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// The route to open on, from `--person`.
fn entry_route(person: Option<&str>) -> Result<Route> {
  match person {
    Some(id) => Route::parse(&format!("/people/{id}")).context("invalid --person"),
    None => Ok(Route::Root),
  }
}

fn init_logging(path: &Path) -> Result<WorkerGuard> {
  let (writer, guard) = log_writer(path)?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(writer)
    .init();
  Ok(guard)
}

/// Background writer appending to `path`. Lines are flushed when the guard
/// drops.
fn log_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
  let name = path
    .file_name()
    .with_context(|| format!("log file {} has no file name", path.display()))?;
  let dir = path
    .parent()
    .filter(|d| !d.as_os_str().is_empty())
    .unwrap_or(Path::new("."));
  std::fs::create_dir_all(dir)
    .with_context(|| format!("creating log directory {}", dir.display()))?;

  let appender = RollingFileAppender::builder()
    .rotation(Rotation::NEVER)
    .filename_prefix(name.to_string_lossy())
    .build(dir)
    .with_context(|| format!("opening log file {}", path.display()))?;
  Ok(tracing_appender::non_blocking(appender))
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.poll_bootstrap().await;
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    // Store updates land between keypresses; the next frame picks them up.
    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
