//! SQL schema for the linkid SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

-- Rows are never deleted; only linked_id, link_precedence and updated_at
-- change after insertion.
CREATE TABLE IF NOT EXISTS contacts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number    TEXT,
    email           TEXT,
    linked_id       INTEGER REFERENCES contacts(id),
    link_precedence TEXT NOT NULL CHECK (link_precedence IN ('primary', 'secondary')),
    created_at      TEXT NOT NULL,   -- RFC 3339 UTC, fixed width; server-assigned
    updated_at      TEXT NOT NULL,
    CHECK (email IS NOT NULL OR phone_number IS NOT NULL),
    CHECK ((link_precedence = 'primary')   = (linked_id IS NULL))
);

CREATE INDEX IF NOT EXISTS contacts_email_idx     ON contacts(email);
CREATE INDEX IF NOT EXISTS contacts_phone_idx     ON contacts(phone_number);
CREATE INDEX IF NOT EXISTS contacts_linked_id_idx ON contacts(linked_id);

PRAGMA user_version = 1;
";
