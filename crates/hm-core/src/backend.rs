//! The `Backend` trait: the REST boundary the client depends on.
//!
//! The trait is implemented by `hm-client` over HTTP. Higher layers
//! (`hm-sync`, `hm-cli`) depend on this abstraction, not on any transport.

use std::future::Future;

use crate::{
  message::{Message, MessageId},
  person::{NetworkStats, Person, PersonFields, PersonId},
  session::{AuthCode, Settings, UserInfo},
};

/// Abstraction over the HM REST backend.
///
/// Each method maps to exactly one endpoint. Single-record reads and writes
/// return `Ok(None)` when the record does not exist, so callers can tell a
/// missing record apart from a failed call.
///
/// All methods return `Send` futures so stores can spawn them on a tokio
/// runtime.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Public ────────────────────────────────────────────────────────────

  /// `GET /api/public/settings`
  fn settings(&self) -> impl Future<Output = Result<Settings, Self::Error>> + Send + '_;

  /// `GET /api/public/auth/callback?code=`. Codes are single-use.
  fn exchange_code<'a>(
    &'a self,
    code: &'a AuthCode,
  ) -> impl Future<Output = Result<UserInfo, Self::Error>> + Send + 'a;

  // ── People ────────────────────────────────────────────────────────────

  /// `GET /api/private/people/`
  fn list_people(&self) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// `GET /api/private/people/{id}`
  fn get_person<'a>(
    &'a self,
    id: &'a PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// `POST /api/private/people/`. Returns the created record.
  fn create_person<'a>(
    &'a self,
    fields: &'a PersonFields,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + 'a;

  /// `PUT /api/private/people/{id}`. Replaces every mutable field.
  fn update_person<'a>(
    &'a self,
    id: &'a PersonId,
    fields: &'a PersonFields,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// `DELETE /api/private/people/{id}`
  fn delete_person<'a>(
    &'a self,
    id: &'a PersonId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// `GET /api/private/network/stat`
  fn network_stats(&self) -> impl Future<Output = Result<NetworkStats, Self::Error>> + Send + '_;

  // ── Inbox ─────────────────────────────────────────────────────────────

  /// `GET /api/private/user/inbox`
  fn list_inbox(&self) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// `POST /api/private/user/inbox/{id}/read`. Idempotent on the server.
  fn mark_read<'a>(
    &'a self,
    id: &'a MessageId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
