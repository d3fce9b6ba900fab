//! [`SqliteStore`], the SQLite implementation of [`DirectoryStore`].

use std::path::Path;

use hm_core::{
  message::{DEFAULT_MESSAGE_TYPE, Message, MessageId},
  person::{Person, PersonFields, PersonId},
  store::DirectoryStore,
  user::{Identity, User, WELCOME_MESSAGE},
};
use rusqlite::OptionalExtension as _;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    PERSON_COLUMNS, PersonParams, RawMessage, RawPerson, RawUser, encode_dt, encode_uuid, now,
  },
  schema::SCHEMA,
};

const USER_COLUMNS: &str = "user_id, open_id, name, avatar_url, created_at, last_login_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An HM directory store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn user_by_open_id(&self, open_id: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE open_id = ?1"),
              rusqlite::params![open_id],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = crate::Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn list_people(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM people ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn get_person(&self, id: &PersonId) -> Result<Option<Person>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM people WHERE person_id = ?1"),
              rusqlite::params![id_str],
              RawPerson::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn create_person(&self, fields: &PersonFields) -> Result<Person> {
    let person = Person {
      id:         PersonId::new(encode_uuid(Uuid::new_v4())),
      fields:     fields.clone(),
      created_at: now(),
      updated_at: None,
    };

    let id_str = person.id.as_str().to_owned();
    let at_str = encode_dt(person.created_at);
    let p = PersonParams::from_fields(fields);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (
             person_id, name, nickname, gender, birthday, resources, needs,
             phone, email, city, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            p.name,
            p.nickname,
            p.gender,
            p.birthday,
            p.resources,
            p.needs,
            p.phone,
            p.email,
            p.city,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    debug!(id = %person.id, "person inserted");
    Ok(person)
  }

  async fn update_person(&self, id: &PersonId, fields: &PersonFields) -> Result<Option<Person>> {
    let id_str = id.as_str().to_owned();
    let at_str = encode_dt(now());
    let p = PersonParams::from_fields(fields);

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE people SET
             name = ?2, nickname = ?3, gender = ?4, birthday = ?5,
             resources = ?6, needs = ?7, phone = ?8, email = ?9, city = ?10,
             updated_at = ?11
           WHERE person_id = ?1",
          rusqlite::params![
            id_str,
            p.name,
            p.nickname,
            p.gender,
            p.birthday,
            p.resources,
            p.needs,
            p.phone,
            p.email,
            p.city,
            at_str,
          ],
        )?;
        Ok(n)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_person(id).await
  }

  async fn delete_person(&self, id: &PersonId) -> Result<bool> {
    let id_str = id.as_str().to_owned();
    let n = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM people WHERE person_id = ?1", [id_str])?))
      .await?;
    Ok(n > 0)
  }

  async fn count_people(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT count(*) FROM people", [], |r| r.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn record_login(&self, identity: &Identity) -> Result<User> {
    let at = encode_dt(now());
    let new_id = encode_uuid(Uuid::new_v4());
    let welcome_id = encode_uuid(Uuid::new_v4());
    let Identity {
      open_id,
      name,
      avatar_url,
    } = identity.clone();
    let lookup = open_id.clone();

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<String> = tx
          .query_row(
            "SELECT user_id FROM users WHERE open_id = ?1",
            [&open_id],
            |r| r.get(0),
          )
          .optional()?;

        let created = match existing {
          Some(user_id) => {
            tx.execute(
              "UPDATE users SET name = ?2, avatar_url = ?3, last_login_at = ?4
               WHERE user_id = ?1",
              rusqlite::params![user_id, name, avatar_url, at],
            )?;
            false
          }
          None => {
            tx.execute(
              "INSERT INTO users (user_id, open_id, name, avatar_url, created_at, last_login_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
              rusqlite::params![new_id, open_id, name, avatar_url, at],
            )?;
            tx.execute(
              "INSERT INTO inbox_messages (message_id, user_id, text, message_type, date)
               VALUES (?1, ?2, ?3, ?4, ?5)",
              rusqlite::params![welcome_id, new_id, WELCOME_MESSAGE, DEFAULT_MESSAGE_TYPE, at],
            )?;
            true
          }
        };
        tx.commit()?;
        Ok(created)
      })
      .await?;

    let user = self
      .user_by_open_id(lookup)
      .await?
      .ok_or_else(|| crate::Error::InvalidColumn {
        column: "open_id",
        value:  identity.open_id.clone(),
      })?;
    if created {
      info!(user = %user.id, "new user registered");
    }
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  // ── Inbox ─────────────────────────────────────────────────────────────────

  async fn list_inbox(&self, user_id: Uuid, limit: usize) -> Result<Vec<Message>> {
    let user_str = encode_uuid(user_id);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT message_id, text, message_type, date, read
           FROM inbox_messages
           WHERE user_id = ?1
           ORDER BY date DESC, rowid DESC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, limit], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn add_message(
    &self,
    user_id: Uuid,
    text: &str,
    message_type: Option<&str>,
  ) -> Result<Message> {
    let message = Message {
      id:           MessageId::new(encode_uuid(Uuid::new_v4())),
      text:         text.to_owned(),
      message_type: message_type.map(str::to_owned),
      date:         now(),
      read:         false,
    };

    let id_str = message.id.as_str().to_owned();
    let user_str = encode_uuid(user_id);
    let text = message.text.clone();
    let kind = message.message_type.clone();
    let date = encode_dt(message.date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO inbox_messages (message_id, user_id, text, message_type, date)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, user_str, text, kind, date],
        )?;
        Ok(())
      })
      .await?;

    Ok(message)
  }

  async fn mark_read(&self, user_id: Uuid, id: &MessageId) -> Result<bool> {
    let user_str = encode_uuid(user_id);
    let id_str = id.as_str().to_owned();

    // Matches already-read rows too, so a repeat call still reports success.
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE inbox_messages SET read = 1 WHERE message_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }
}
