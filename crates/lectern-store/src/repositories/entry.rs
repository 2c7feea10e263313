//! Entry repository — row-level access to the `entries` table.

use lectern_core::entry::{Entry, NewEntry, SessionKind};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::errors::Result;

/// Entry repository — stateless, every method takes `&Connection`.
pub struct EntryRepo;

impl EntryRepo {
    /// Insert one entry. Idempotent: a duplicate of an existing
    /// (kind, number, timestamp, speaker) tuple is a no-op and returns `None`;
    /// otherwise returns the assigned id.
    pub fn insert(conn: &Connection, entry: &NewEntry) -> Result<Option<i64>> {
        let changed = conn.execute(
            "INSERT OR IGNORE INTO entries
               (session_kind, session_number, speaker, timestamp, content)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.session_kind.as_str(),
                entry.session_number,
                entry.speaker,
                entry.timestamp,
                entry.content
            ],
        )?;
        if changed > 0 {
            Ok(Some(conn.last_insert_rowid()))
        } else {
            Ok(None)
        }
    }

    /// Exact-id lookup.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Entry>> {
        let entry = conn
            .query_row(
                "SELECT id, session_kind, session_number, speaker, timestamp, content
                 FROM entries WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// All entries of one session, ordered by timestamp then id.
    pub fn list_for_session(
        conn: &Connection,
        kind: SessionKind,
        number: u32,
    ) -> Result<Vec<Entry>> {
        let mut stmt = conn.prepare(
            "SELECT id, session_kind, session_number, speaker, timestamp, content
             FROM entries
             WHERE session_kind = ?1 AND session_number = ?2
             ORDER BY timestamp, id",
        )?;
        let entries = stmt
            .query_map(params![kind.as_str(), number], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Total entry count.
    pub fn count(conn: &Connection) -> Result<u64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub(crate) fn map_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
        let kind_str: String = row.get(1)?;
        let session_kind = kind_str
            .parse::<SessionKind>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
        Ok(Entry {
            id: row.get(0)?,
            session_kind,
            session_number: row.get(2)?,
            speaker: row.get(3)?,
            timestamp: row.get(4)?,
            content: row.get(5)?,
        })
    }
}
