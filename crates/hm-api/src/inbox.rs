//! Handlers for `/api/private/user` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/private/user/me` | The session's user record |
//! | `GET`  | `/api/private/user/inbox` | Newest 20, `date` descending |
//! | `POST` | `/api/private/user/inbox/{id}/read` | Idempotent; 404 if not the caller's |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use hm_core::{
  message::{Message, MessageId},
  store::{DirectoryStore, INBOX_LIMIT},
  user::User,
};
use tracing::debug;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// `GET /api/private/user/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<User>, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  let user = state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
  Ok(Json(user))
}

/// `GET /api/private/user/inbox`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Message>>, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  let messages = state
    .store
    .list_inbox(user_id, INBOX_LIMIT)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(messages))
}

/// `POST /api/private/user/inbox/{id}/read`
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user_id): CurrentUser,
  Path(id): Path<MessageId>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  if !state
    .store
    .mark_read(user_id, &id)
    .await
    .map_err(ApiError::store)?
  {
    return Err(ApiError::NotFound(format!("message {id} not found")));
  }
  debug!(%id, "message marked read");
  Ok(StatusCode::NO_CONTENT)
}
