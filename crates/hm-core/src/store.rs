//! The `DirectoryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `hm-store-sqlite`) and
//! consumed by the reference API server. Clients never see it; they talk to
//! the server through [`Backend`](crate::backend::Backend).

use std::future::Future;

use uuid::Uuid;

use crate::{
  message::{Message, MessageId},
  person::{Person, PersonFields, PersonId},
  user::{Identity, User},
};

/// How many messages an inbox listing returns at most.
pub const INBOX_LIMIT: usize = 20;

/// Abstraction over the persistent state behind the REST API.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// Every person, newest `created_at` first.
  fn list_people(&self) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person<'a>(
    &'a self,
    id: &'a PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Persist a new person. The store assigns `id` and `created_at`.
  fn create_person<'a>(
    &'a self,
    fields: &'a PersonFields,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + 'a;

  /// Replace every mutable field and stamp `updated_at`. Returns `None` if
  /// the person does not exist.
  fn update_person<'a>(
    &'a self,
    id: &'a PersonId,
    fields: &'a PersonFields,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Delete a person. Returns `false` if there was nothing to delete.
  fn delete_person<'a>(
    &'a self,
    id: &'a PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn count_people(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Record a login for `identity`.
  ///
  /// A first login creates the user and delivers
  /// [`WELCOME_MESSAGE`](crate::user::WELCOME_MESSAGE) to their inbox; later
  /// logins refresh `name`, `avatar_url` and `last_login_at`.
  fn record_login<'a>(
    &'a self,
    identity: &'a Identity,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  fn get_user(&self, id: Uuid) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Inbox ─────────────────────────────────────────────────────────────

  /// A user's newest messages, `date` descending, at most `limit`.
  fn list_inbox(
    &self,
    user_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Deliver a message to a user's inbox.
  fn add_message<'a>(
    &'a self,
    user_id: Uuid,
    text: &'a str,
    message_type: Option<&'a str>,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + 'a;

  /// Mark one of `user_id`'s messages read. Idempotent; returns `false` if
  /// the message does not exist or belongs to someone else.
  fn mark_read<'a>(
    &'a self,
    user_id: Uuid,
    id: &'a MessageId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
