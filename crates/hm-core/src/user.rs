//! Server-side user records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::session::UserInfo;

/// Sent to every user the first time they log in.
pub const WELCOME_MESSAGE: &str = "Welcome! 👋 We're glad to have you in HM.";

/// A user known to the backend, keyed by the host-assigned `open_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:            Uuid,
  pub open_id:       String,
  pub name:          String,
  #[serde(default)]
  pub avatar_url:    Option<String>,
  pub created_at:    DateTime<Utc>,
  pub last_login_at: DateTime<Utc>,
}

/// The identity a host grant (or the mock mode) vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub open_id:    String,
  pub name:       String,
  #[serde(default)]
  pub avatar_url: Option<String>,
}

impl Identity {
  /// What the code exchange returns to the client.
  pub fn user_info(&self) -> UserInfo {
    let mut extra = Map::new();
    extra.insert("open_id".into(), Value::String(self.open_id.clone()));
    UserInfo {
      name: self.name.clone(),
      avatar_url: self.avatar_url.clone(),
      extra,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn user_info_carries_open_id() {
    let identity = Identity {
      open_id:    "ou_1".into(),
      name:       "Ada".into(),
      avatar_url: None,
    };
    let info = identity.user_info();
    assert_eq!(info.name, "Ada");
    assert_eq!(info.field("open_id"), Some("ou_1"));

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["open_id"], "ou_1");
  }
}
