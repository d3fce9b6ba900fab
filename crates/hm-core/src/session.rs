//! Integration settings, authorization codes and the authenticated identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Shown in place of a missing or unloadable avatar.
pub const AVATAR_PLACEHOLDER: &str = "/static/avatar-placeholder.png";

// ─── Settings ────────────────────────────────────────────────────────────────

/// Host integration parameters served by `GET /api/public/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  /// Host application identifier. Bootstrap cannot proceed without it.
  #[serde(default)]
  pub appid:     Option<String>,
  /// Skip the host handshake and exchange [`AuthCode::mock`] directly.
  #[serde(default)]
  pub mock_user: bool,
  /// Any further integration fields the server sends.
  #[serde(flatten)]
  pub extra:     Map<String, Value>,
}

impl Settings {
  /// The application identifier, if present and non-blank.
  pub fn app_id(&self) -> Option<&str> {
    self.appid.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }
}

// ─── Authorization code ──────────────────────────────────────────────────────

/// A single-use authorization code issued by the host.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthCode(String);

impl AuthCode {
  const MOCK: &'static str = "mock";

  pub fn new(code: impl Into<String>) -> Self { Self(code.into()) }

  /// The well-known placeholder code used in mock identity mode.
  pub fn mock() -> Self { Self(Self::MOCK.to_owned()) }

  pub fn is_mock(&self) -> bool { self.0 == Self::MOCK }

  pub fn as_str(&self) -> &str { &self.0 }
}

// Codes are credentials; keep them out of logs.
impl fmt::Debug for AuthCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_mock() {
      f.write_str("AuthCode(mock)")
    } else {
      f.write_str("AuthCode(..)")
    }
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The user identity returned by the code exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
  pub name:       String,
  #[serde(default)]
  pub avatar_url: Option<String>,
  /// Remaining identity fields (`open_id`, `email`, ...).
  #[serde(flatten)]
  pub extra:      Map<String, Value>,
}

impl UserInfo {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:       name.into(),
      avatar_url: None,
      extra:      Map::new(),
    }
  }

  /// The avatar URL, or [`AVATAR_PLACEHOLDER`] when none was supplied.
  pub fn avatar_or_placeholder(&self) -> &str {
    match self.avatar_url.as_deref() {
      Some(url) if !url.is_empty() => url,
      _ => AVATAR_PLACEHOLDER,
    }
  }

  /// A string-valued identity field from `extra`.
  pub fn field(&self, key: &str) -> Option<&str> {
    self.extra.get(key).and_then(Value::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_appid_counts_as_missing() {
    let s: Settings = serde_json::from_str(r#"{"appid":"  "}"#).unwrap();
    assert_eq!(s.app_id(), None);
    assert!(!s.mock_user);

    let s: Settings =
      serde_json::from_str(r#"{"appid":"cli_1","mock_user":true,"tenant":"x"}"#).unwrap();
    assert_eq!(s.app_id(), Some("cli_1"));
    assert!(s.mock_user);
    assert_eq!(s.extra["tenant"], "x");
  }

  #[test]
  fn user_info_keeps_extra_fields_and_placeholder() {
    let u: UserInfo = serde_json::from_value(serde_json::json!({
      "name": "Ada",
      "open_id": "ou_1",
      "avatar_url": ""
    }))
    .unwrap();
    assert_eq!(u.field("open_id"), Some("ou_1"));
    assert_eq!(u.avatar_or_placeholder(), AVATAR_PLACEHOLDER);
  }

  #[test]
  fn auth_code_debug_hides_value() {
    assert_eq!(format!("{:?}", AuthCode::new("secret")), "AuthCode(..)");
    assert!(AuthCode::mock().is_mock());
  }
}
