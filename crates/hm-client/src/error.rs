//! Error type for `hm-client`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  /// Connection, timeout, or body decoding failure.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with a non-success status.
  #[error("{method} {path} → {status}{}", detail(.message))]
  Status {
    method:  &'static str,
    path:    String,
    status:  u16,
    /// The `error` field of the response body, when there is one.
    message: Option<String>,
  },
}

impl ClientError {
  /// The HTTP status, for errors that carry one.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. } => Some(*status),
      Self::Http(e) => e.status().map(|s| s.as_u16()),
    }
  }
}

fn detail(message: &Option<String>) -> String {
  message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
