//! Session repository — corpus-level aggregation queries.

use lectern_core::entry::{SessionSummary, SpeakerStats, StoreStats};
use rusqlite::types::Type;
use rusqlite::Connection;

use crate::errors::Result;

/// Session repository — stateless, every method takes `&Connection`.
pub struct SessionRepo;

impl SessionRepo {
    /// One summary row per (kind, number) session, ordered by kind then
    /// number.
    pub fn list(conn: &Connection) -> Result<Vec<SessionSummary>> {
        let mut stmt = conn.prepare(
            "SELECT
               session_kind,
               session_number,
               COUNT(*) AS entry_count,
               MIN(timestamp) AS start_time,
               MAX(timestamp) AS end_time,
               COUNT(DISTINCT speaker) AS speaker_count
             FROM entries
             GROUP BY session_kind, session_number
             ORDER BY session_kind, session_number",
        )?;
        let summaries = stmt
            .query_map([], |row| {
                let kind_str: String = row.get(0)?;
                let kind = kind_str.parse().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                })?;
                Ok(SessionSummary {
                    session_kind: kind,
                    session_number: row.get(1)?,
                    entry_count: row.get::<_, i64>(2)? as u64,
                    start_time: row.get(3)?,
                    end_time: row.get(4)?,
                    speaker_count: row.get::<_, i64>(5)? as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    /// Per-speaker contribution counts, busiest speaker first.
    pub fn speaker_stats(conn: &Connection) -> Result<Vec<SpeakerStats>> {
        let mut stmt = conn.prepare(
            "SELECT
               speaker,
               COUNT(*) AS entry_count,
               COUNT(DISTINCT session_kind || '-' || session_number) AS session_count
             FROM entries
             GROUP BY speaker
             ORDER BY entry_count DESC, speaker",
        )?;
        let stats = stmt
            .query_map([], |row| {
                Ok(SpeakerStats {
                    speaker: row.get(0)?,
                    entry_count: row.get::<_, i64>(1)? as u64,
                    session_count: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(stats)
    }

    /// Whole-corpus counters, including the FTS index row count so drift
    /// between the table and its index is visible.
    pub fn stats(conn: &Connection) -> Result<StoreStats> {
        let count = |sql: &str| -> Result<u64> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as u64)
        };

        Ok(StoreStats {
            total_entries: count("SELECT COUNT(*) FROM entries")?,
            lecture_entries: count(
                "SELECT COUNT(*) FROM entries WHERE session_kind = 'lecture'",
            )?,
            officehours_entries: count(
                "SELECT COUNT(*) FROM entries WHERE session_kind = 'officehours'",
            )?,
            unique_sessions: count(
                "SELECT COUNT(DISTINCT session_kind || '-' || session_number) FROM entries",
            )?,
            unique_speakers: count("SELECT COUNT(DISTINCT speaker) FROM entries")?,
            indexed_entries: count("SELECT COUNT(*) FROM entries_fts")?,
        })
    }
}
