//! Session cookies, single-use grant codes and the [`CurrentUser`] extractor.

use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, HeaderValue, header, request::Parts},
};
use hm_core::{store::DirectoryStore, user::Identity};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "hm_session";

// ─── Sessions ─────────────────────────────────────────────────────────────────

/// In-memory session table: token → user id. Sessions end with the process.
#[derive(Clone, Default)]
pub struct Sessions(Arc<RwLock<HashMap<String, Uuid>>>);

impl Sessions {
  /// Start a session for `user_id` and return its token.
  pub async fn open(&self, user_id: Uuid) -> String {
    let token = Uuid::new_v4().simple().to_string();
    self.0.write().await.insert(token.clone(), user_id);
    token
  }

  pub async fn user(&self, token: &str) -> Option<Uuid> { self.0.read().await.get(token).copied() }
}

/// `Set-Cookie` value for a session token.
pub fn session_cookie(token: &str) -> Result<HeaderValue, ApiError> {
  HeaderValue::from_str(&format!(
    "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"
  ))
  .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// The session token from the request's `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find_map(|(name, value)| (name == SESSION_COOKIE).then_some(value))
}

// ─── Grants ───────────────────────────────────────────────────────────────────

/// Authorization codes issued out of band. Each can be redeemed once.
#[derive(Clone, Default)]
pub struct Grants(Arc<Mutex<HashMap<String, Identity>>>);

impl Grants {
  pub fn new(codes: HashMap<String, Identity>) -> Self { Self(Arc::new(Mutex::new(codes))) }

  /// Consume `code`, returning the identity it was issued for.
  pub async fn redeem(&self, code: &str) -> Option<Identity> { self.0.lock().await.remove(code) }
}

// ─── Extractor ────────────────────────────────────────────────────────────────

/// The user behind a valid session cookie. Rejects with 403 otherwise.
pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: DirectoryStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = session_token(&parts.headers).ok_or(ApiError::Forbidden)?;
    match state.sessions.user(token).await {
      Some(user_id) => Ok(CurrentUser(user_id)),
      None => {
        debug!("unknown session token");
        Err(ApiError::Forbidden)
      }
    }
  }
}
