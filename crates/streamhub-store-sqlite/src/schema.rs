//! SQL schema for the stream hub SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per key; saves are upserts.
CREATE TABLE IF NOT EXISTS settings (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    key    TEXT NOT NULL UNIQUE,
    value  TEXT NOT NULL
);

-- Immutable after insert; only DELETE is issued.
CREATE TABLE IF NOT EXISTS announcements (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    kind       TEXT NOT NULL DEFAULT 'default',  -- 'default' | 'special' | 'important'
    created_at TEXT NOT NULL                     -- RFC 3339 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS stream_schedules (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    stream_type TEXT NOT NULL,
    date        TEXT NOT NULL,
    time        TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 0
);

-- At most one active schedule.
CREATE UNIQUE INDEX IF NOT EXISTS stream_schedules_one_active
    ON stream_schedules(is_active) WHERE is_active = 1;

CREATE INDEX IF NOT EXISTS announcements_created_idx ON announcements(created_at);

PRAGMA user_version = 1;
";
