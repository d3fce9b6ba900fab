//! Reference REST backend for HM.
//!
//! Exposes an axum [`Router`] backed by any [`DirectoryStore`], serving the
//! public settings and code-exchange endpoints plus the session-guarded
//! people, network and inbox endpoints.
//!
//! | Method   | Path                                   |
//! |----------|----------------------------------------|
//! | `GET`    | `/api/public/settings`                 |
//! | `GET`    | `/api/public/auth/callback?code=`      |
//! | `GET`    | `/api/private/people/`                 |
//! | `POST`   | `/api/private/people/`                 |
//! | `GET`    | `/api/private/people/{id}`             |
//! | `PUT`    | `/api/private/people/{id}`             |
//! | `DELETE` | `/api/private/people/{id}`             |
//! | `GET`    | `/api/private/network/stat`            |
//! | `GET`    | `/api/private/user/me`                 |
//! | `GET`    | `/api/private/user/inbox`              |
//! | `POST`   | `/api/private/user/inbox/{id}/read`    |

pub mod auth;
pub mod error;
pub mod inbox;
pub mod network;
pub mod people;
pub mod public;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use hm_core::{store::DirectoryStore, user::Identity};
use serde::Deserialize;

pub use error::ApiError;

use auth::{Grants, Sessions};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `HM_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_store_path")]
  pub store_path:    PathBuf,
  /// Host application id handed to clients. Clients refuse to start
  /// without one.
  #[serde(default)]
  pub appid:         Option<String>,
  /// Let clients skip the host handshake and log in as `mock_identity`.
  #[serde(default)]
  pub mock_user:     bool,
  #[serde(default = "default_mock_identity")]
  pub mock_identity: Identity,
  /// Single-use authorization codes and the identities they vouch for.
  #[serde(default)]
  pub grants:        Vec<GrantConfig>,
}

/// One `[[grants]]` table.
#[derive(Debug, Deserialize, Clone)]
pub struct GrantConfig {
  pub code:     String,
  pub identity: Identity,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("hm.db") }

fn default_mock_identity() -> Identity {
  Identity {
    open_id:    "mock".into(),
    name:       "Mock User".into(),
    avatar_url: None,
  }
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          default_host(),
      port:          default_port(),
      store_path:    default_store_path(),
      appid:         None,
      mock_user:     false,
      mock_identity: default_mock_identity(),
      grants:        Vec::new(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: DirectoryStore> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub sessions: Sessions,
  pub grants:   Grants,
}

impl<S: DirectoryStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    let grants = Grants::new(
      config
        .grants
        .iter()
        .map(|g| (g.code.clone(), g.identity.clone()))
        .collect(),
    );
    Self {
      store: Arc::new(store),
      config: Arc::new(config),
      sessions: Sessions::default(),
      grants,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DirectoryStore + Clone + 'static,
{
  Router::new()
    // Public
    .route("/api/public/settings", get(public::settings::<S>))
    .route("/api/public/auth/callback", get(public::callback::<S>))
    // People
    .route(
      "/api/private/people/",
      get(people::list::<S>).post(people::create::<S>),
    )
    .route(
      "/api/private/people/{id}",
      get(people::get_one::<S>)
        .put(people::update::<S>)
        .delete(people::delete::<S>),
    )
    .route("/api/private/network/stat", get(network::stats::<S>))
    // User
    .route("/api/private/user/me", get(inbox::me::<S>))
    .route("/api/private/user/inbox", get(inbox::list::<S>))
    .route("/api/private/user/inbox/{id}/read", post(inbox::mark_read::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
