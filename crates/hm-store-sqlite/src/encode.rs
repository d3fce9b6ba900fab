//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with microsecond precision,
//! birthdays as `YYYY-MM-DD`, UUIDs as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use hm_core::{
  message::{Message, MessageId},
  person::{Gender, Person, PersonFields, PersonId},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time, truncated to the precision [`encode_dt`] keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Gender ───────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> String { g.to_string() }

pub fn decode_gender(s: &str) -> Result<Gender> {
  Gender::from_str(s).map_err(|_| Error::InvalidColumn {
    column: "gender",
    value:  s.to_owned(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values bound for an INSERT or UPDATE of `people`.
pub struct PersonParams {
  pub name:      String,
  pub nickname:  Option<String>,
  pub gender:    Option<String>,
  pub birthday:  Option<String>,
  pub resources: Option<String>,
  pub needs:     Option<String>,
  pub phone:     Option<String>,
  pub email:     Option<String>,
  pub city:      Option<String>,
}

impl PersonParams {
  pub fn from_fields(f: &PersonFields) -> Self {
    Self {
      name:      f.name.clone(),
      nickname:  f.nickname.clone(),
      gender:    f.gender.map(encode_gender),
      birthday:  f.birthday.map(encode_date),
      resources: f.resources.clone(),
      needs:     f.needs.clone(),
      phone:     f.phone.clone(),
      email:     f.email.clone(),
      city:      f.city.clone(),
    }
  }
}

/// Column list matching [`RawPerson::from_row`].
pub const PERSON_COLUMNS: &str = "person_id, name, nickname, gender, birthday, resources, needs, \
                                  phone, email, city, created_at, updated_at";

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub person_id:  String,
  pub name:       String,
  pub nickname:   Option<String>,
  pub gender:     Option<String>,
  pub birthday:   Option<String>,
  pub resources:  Option<String>,
  pub needs:      Option<String>,
  pub phone:      Option<String>,
  pub email:      Option<String>,
  pub city:       Option<String>,
  pub created_at: String,
  pub updated_at: Option<String>,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:  row.get(0)?,
      name:       row.get(1)?,
      nickname:   row.get(2)?,
      gender:     row.get(3)?,
      birthday:   row.get(4)?,
      resources:  row.get(5)?,
      needs:      row.get(6)?,
      phone:      row.get(7)?,
      email:      row.get(8)?,
      city:       row.get(9)?,
      created_at: row.get(10)?,
      updated_at: row.get(11)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:         PersonId::new(self.person_id),
      fields:     PersonFields {
        name:      self.name,
        nickname:  self.nickname,
        gender:    self.gender.as_deref().map(decode_gender).transpose()?,
        birthday:  self.birthday.as_deref().map(decode_date).transpose()?,
        resources: self.resources,
        needs:     self.needs,
        phone:     self.phone,
        email:     self.email,
        city:      self.city,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub open_id:       String,
  pub name:          String,
  pub avatar_url:    Option<String>,
  pub created_at:    String,
  pub last_login_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      open_id:       row.get(1)?,
      name:          row.get(2)?,
      avatar_url:    row.get(3)?,
      created_at:    row.get(4)?,
      last_login_at: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            decode_uuid(&self.user_id)?,
      open_id:       self.open_id,
      name:          self.name,
      avatar_url:    self.avatar_url,
      created_at:    decode_dt(&self.created_at)?,
      last_login_at: decode_dt(&self.last_login_at)?,
    })
  }
}

/// Raw values read directly from an `inbox_messages` row.
pub struct RawMessage {
  pub message_id:   String,
  pub text:         String,
  pub message_type: Option<String>,
  pub date:         String,
  pub read:         bool,
}

impl RawMessage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id:   row.get(0)?,
      text:         row.get(1)?,
      message_type: row.get(2)?,
      date:         row.get(3)?,
      read:         row.get(4)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      id:           MessageId::new(self.message_id),
      text:         self.text,
      message_type: self.message_type,
      date:         decode_dt(&self.date)?,
      read:         self.read,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_as_text() {
    let a = decode_dt("2024-01-01T00:00:00Z").unwrap();
    let b = decode_dt("2024-01-01T00:00:00.5Z").unwrap();
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(encode_dt(a).len(), encode_dt(b).len());
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn unknown_gender_is_rejected() {
    assert_eq!(decode_gender("female").unwrap(), Gender::Female);
    assert!(matches!(
      decode_gender("robot"),
      Err(Error::InvalidColumn { column: "gender", .. })
    ));
  }
}
