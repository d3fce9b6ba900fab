//! SQL schema for the HM SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 UTC strings, so text order is
/// chronological order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    person_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL CHECK (length(trim(name)) > 0),
    nickname    TEXT,
    gender      TEXT,            -- 'male' | 'female' | 'other'
    birthday    TEXT,            -- YYYY-MM-DD
    resources   TEXT,
    needs       TEXT,
    phone       TEXT,
    email       TEXT,
    city        TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    open_id       TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    avatar_url    TEXT,
    created_at    TEXT NOT NULL,
    last_login_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS inbox_messages (
    message_id   TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    text         TEXT NOT NULL,
    message_type TEXT,
    date         TEXT NOT NULL,
    read         INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS people_created_idx ON people(created_at);
CREATE INDEX IF NOT EXISTS inbox_user_date_idx ON inbox_messages(user_id, date);

PRAGMA user_version = 1;
";
