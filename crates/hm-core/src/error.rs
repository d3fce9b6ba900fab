//! Error types for `hm-core`.

use thiserror::Error;

use crate::person::PersonId;

#[derive(Debug, Error)]
pub enum Error {
  /// The integration settings are missing a required value (e.g. `appid`).
  #[error("configuration error: {0}")]
  Configuration(String),

  /// The host SDK capability is not present in this environment.
  #[error("host sdk unavailable")]
  HostUnavailable,

  /// The authorization grant or the code exchange failed.
  #[error("authorization failed: {0}")]
  AuthExchange(String),

  /// A directory or inbox network call failed.
  #[error("fetch failed: {0}")]
  Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("invalid input: {0}")]
  Validation(String),

  #[error("removal of person {0} was not confirmed")]
  Unconfirmed(PersonId),

  #[error("session is already initialised")]
  SessionAlreadyInitialised,
}

impl Error {
  /// Wrap a backend error as a [`Error::Fetch`].
  pub fn fetch<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Fetch(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
