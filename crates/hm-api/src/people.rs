//! Handlers for `/api/private/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/private/people/` | Newest first |
//! | `POST`   | `/api/private/people/` | Body: person fields; `name` required |
//! | `GET`    | `/api/private/people/{id}` | 404 if not found |
//! | `PUT`    | `/api/private/people/{id}` | Full replacement; 404 if not found |
//! | `DELETE` | `/api/private/people/{id}` | 204; 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use hm_core::{
  person::{Person, PersonFields, PersonId},
  store::DirectoryStore,
};
use tracing::info;

use crate::{AppState, auth::CurrentUser, error::ApiError};

fn not_found(id: &PersonId) -> ApiError { ApiError::NotFound(format!("person {id} not found")) }

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/private/people/`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  let people = state.store.list_people().await.map_err(ApiError::store)?;
  Ok(Json(people))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /api/private/people/`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Json(fields): Json<PersonFields>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  fields.validate()?;
  let person = state
    .store
    .create_person(&fields)
    .await
    .map_err(ApiError::store)?;
  info!(id = %person.id, "person created");
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/private/people/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  let person = state
    .store
    .get_person(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(&id))?;
  Ok(Json(person))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /api/private/people/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<PersonId>,
  Json(fields): Json<PersonFields>,
) -> Result<Json<Person>, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  fields.validate()?;
  let person = state
    .store
    .update_person(&id, &fields)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(&id))?;
  info!(%id, "person updated");
  Ok(Json(person))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/private/people/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<PersonId>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore + Clone + 'static,
{
  if !state.store.delete_person(&id).await.map_err(ApiError::store)? {
    return Err(not_found(&id));
  }
  info!(%id, "person deleted");
  Ok(StatusCode::NO_CONTENT)
}
