//! `GET /api/private/network/stat`

use axum::{Json, extract::State};
use hm_core::{person::NetworkStats, store::DirectoryStore};

use crate::{AppState, auth::CurrentUser, error::ApiError};

pub async fn stats<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
) -> Result<Json<NetworkStats>, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  let total_people = state.store.count_people().await.map_err(ApiError::store)?;
  Ok(Json(NetworkStats { total_people }))
}
