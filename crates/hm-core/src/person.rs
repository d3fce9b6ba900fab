//! A person in the people directory, and the derived
//! [`NetworkStats`] aggregate.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque, server-assigned person identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for PersonId {
  fn from(s: &str) -> Self { Self::new(s) }
}

// ─── Gender ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gender {
  Male,
  Female,
  /// Also absorbs any value the server sends that this client does not know.
  #[serde(other)]
  Other,
}

// ─── Mutable fields ──────────────────────────────────────────────────────────

/// The replaceable part of a [`Person`].
///
/// Used both as the create body and as the update body. An update replaces
/// every field, so a `None` here clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFields {
  pub name:      String,
  #[serde(default)]
  pub nickname:  Option<String>,
  #[serde(default)]
  pub gender:    Option<Gender>,
  #[serde(default)]
  pub birthday:  Option<NaiveDate>,
  #[serde(default)]
  pub resources: Option<String>,
  #[serde(default)]
  pub needs:     Option<String>,
  #[serde(default)]
  pub phone:     Option<String>,
  #[serde(default)]
  pub email:     Option<String>,
  #[serde(default)]
  pub city:      Option<String>,
}

impl PersonFields {
  /// Fields with only a name and a nickname set, as the add-person form
  /// produces them.
  pub fn named(name: impl Into<String>, nickname: Option<String>) -> Self {
    Self {
      name: name.into(),
      nickname,
      ..Self::default()
    }
  }

  /// Required-field presence check: `name` must be non-empty after trimming.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Validation("name must not be empty".into()));
    }
    Ok(())
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A directory entry as returned by the backend.
///
/// `id` and `created_at` never change after creation; `updated_at` is absent
/// until the first successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:         PersonId,
  #[serde(flatten)]
  pub fields:     PersonFields,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

impl Person {
  pub fn name(&self) -> &str { &self.fields.name }

  pub fn nickname(&self) -> Option<&str> { self.fields.nickname.as_deref() }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Aggregate computed by the backend; re-fetched whenever people change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
  pub total_people: u64,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn validate_rejects_blank_name() {
    let fields = PersonFields::named("   ", Some("nick".into()));
    assert!(matches!(fields.validate(), Err(Error::Validation(_))));
    assert!(PersonFields::named("Ada", None).validate().is_ok());
  }

  #[test]
  fn person_deserialises_flat_record_with_nulls() {
    let raw = serde_json::json!({
      "id": "4:abc:12",
      "name": "Ada",
      "nickname": null,
      "gender": "female",
      "birthday": "1815-12-10",
      "phone": null,
      "created_at": "2024-01-02T03:04:05Z",
      "updated_at": null
    });
    let p: Person = serde_json::from_value(raw).unwrap();
    assert_eq!(p.id, PersonId::new("4:abc:12"));
    assert_eq!(p.name(), "Ada");
    assert_eq!(p.fields.gender, Some(Gender::Female));
    assert_eq!(
      p.fields.birthday,
      NaiveDate::from_ymd_opt(1815, 12, 10)
    );
    assert!(p.updated_at.is_none());
  }

  #[test]
  fn unknown_gender_maps_to_other() {
    let g: Gender = serde_json::from_str("\"nonbinary\"").unwrap();
    assert_eq!(g, Gender::Other);
    assert_eq!(Gender::from_str("MALE").unwrap(), Gender::Male);
    assert_eq!(Gender::Female.to_string(), "female");
  }

  #[test]
  fn fields_serialise_without_identity() {
    let body = serde_json::to_value(PersonFields::named("Ada", None)).unwrap();
    assert!(body.get("id").is_none());
    assert!(body.get("created_at").is_none());
    assert_eq!(body["name"], "Ada");
  }
}
