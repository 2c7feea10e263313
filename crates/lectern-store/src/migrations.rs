//! Schema creation.
//!
//! One `entries` table, an FTS5 shadow table kept in sync by triggers, and
//! secondary indexes for the structural filters. Entries are immutable after
//! insert, so only insert/delete triggers exist.

use rusqlite::Connection;

use crate::errors::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_kind TEXT NOT NULL,
    session_number INTEGER NOT NULL,
    speaker TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    content TEXT NOT NULL,
    UNIQUE(session_kind, session_number, timestamp, speaker)
);

CREATE VIRTUAL TABLE IF NOT EXISTS entries_fts USING fts5(
    speaker,
    timestamp,
    content,
    tokenize='porter unicode61'
);

CREATE INDEX IF NOT EXISTS idx_entries_session
    ON entries(session_kind, session_number);
CREATE INDEX IF NOT EXISTS idx_entries_speaker ON entries(speaker);
CREATE INDEX IF NOT EXISTS idx_entries_timestamp ON entries(timestamp);

CREATE TRIGGER IF NOT EXISTS entries_ai AFTER INSERT ON entries BEGIN
    INSERT INTO entries_fts(rowid, speaker, timestamp, content)
    VALUES (new.id, new.speaker, new.timestamp, new.content);
END;

CREATE TRIGGER IF NOT EXISTS entries_ad AFTER DELETE ON entries BEGIN
    DELETE FROM entries_fts WHERE rowid = old.id;
END;
";

/// Create the schema if it does not exist. Idempotent.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
