//! Inbox messages.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label shown for messages that carry no `message_type`.
pub const DEFAULT_MESSAGE_TYPE: &str = "System";

/// Opaque, server-assigned message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for MessageId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for MessageId {
  fn from(s: &str) -> Self { Self::new(s) }
}

/// A notification in the user's inbox.
///
/// `read` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub id:           MessageId,
  pub text:         String,
  #[serde(default)]
  pub message_type: Option<String>,
  pub date:         DateTime<Utc>,
  #[serde(default)]
  pub read:         bool,
}

impl Message {
  /// The display label, falling back to [`DEFAULT_MESSAGE_TYPE`].
  pub fn kind_label(&self) -> &str {
    match self.message_type.as_deref() {
      Some(t) if !t.is_empty() => t,
      _ => DEFAULT_MESSAGE_TYPE,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_fields_take_defaults() {
    let m: Message = serde_json::from_value(serde_json::json!({
      "id": "m1",
      "text": "hello",
      "date": "2024-05-01T10:00:00Z"
    }))
    .unwrap();
    assert!(!m.read);
    assert_eq!(m.kind_label(), "System");
  }

  #[test]
  fn explicit_type_is_kept() {
    let m: Message = serde_json::from_value(serde_json::json!({
      "id": "m2",
      "text": "ping",
      "message_type": "Reminder",
      "date": "2024-05-01T10:00:00Z",
      "read": true
    }))
    .unwrap();
    assert_eq!(m.kind_label(), "Reminder");
    assert!(m.read);
  }
}
