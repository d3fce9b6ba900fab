//! Unauthenticated endpoints: integration settings and the code exchange.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/public/settings` | `{ appid, mock_user }` |
//! | `GET`  | `/api/public/auth/callback?code=` | Sets the session cookie; 401 on an unknown code |

use axum::{
  Json,
  extract::{Query, State},
  http::header,
  response::IntoResponse,
};
use hm_core::{
  session::{AuthCode, Settings},
  store::DirectoryStore,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{AppState, auth::session_cookie, error::ApiError};

// ─── Settings ─────────────────────────────────────────────────────────────────

/// `GET /api/public/settings`
pub async fn settings<S>(State(state): State<AppState<S>>) -> Json<Settings>
where
  S: DirectoryStore + Clone + 'static,
{
  Json(Settings {
    appid: state.config.appid.clone(),
    mock_user: state.config.mock_user,
    ..Settings::default()
  })
}

// ─── Callback ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
  pub code: AuthCode,
}

/// `GET /api/public/auth/callback?code=<code>`
///
/// The mock code is accepted only while mock mode is on. Any other code must
/// be an unredeemed grant.
pub async fn callback<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  let code = params.code;
  let identity = if code.is_mock() && state.config.mock_user {
    state.config.mock_identity.clone()
  } else {
    match state.grants.redeem(code.as_str()).await {
      Some(identity) => identity,
      None => {
        warn!(?code, "rejected authorization code");
        return Err(ApiError::Unauthorized("invalid or expired code".into()));
      }
    }
  };

  let user = state
    .store
    .record_login(&identity)
    .await
    .map_err(ApiError::store)?;
  let token = state.sessions.open(user.id).await;
  info!(user = %user.id, "session opened");

  Ok((
    [(header::SET_COOKIE, session_cookie(&token)?)],
    Json(identity.user_info()),
  ))
}
