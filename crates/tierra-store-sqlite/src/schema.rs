//! SQL schema for the Tierra SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document; collections are a key prefix, not separate tables.
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT NOT NULL,
    doc_id      TEXT NOT NULL,
    fields_json TEXT NOT NULL,   -- top-level JSON object
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at  TEXT NOT NULL,   -- ISO 8601 UTC; bumped on merge
    PRIMARY KEY (collection, doc_id)
);

PRAGMA user_version = 1;
";
