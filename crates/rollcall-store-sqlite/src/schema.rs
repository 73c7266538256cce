//! SQL schema for the rollcall SQLite store.

/// Full schema DDL. Idempotent; applied on every open.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per persisted entry, addressed by its localStorage key.
-- Values are JSON documents; collections are stored as whole arrays and
-- rewritten last-write-wins on every mutation.
CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

PRAGMA user_version = 1;
";
