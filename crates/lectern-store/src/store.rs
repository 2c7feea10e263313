//! Store facade over the repositories.

use lectern_core::entry::{Entry, NewEntry, SessionSummary, SpeakerStats, StoreStats};
use lectern_core::search::{SearchQuery, SearchResult, SessionFilter};
use tracing::{debug, info, instrument};

use crate::connection::{self, ConnectionConfig, ConnectionPool};
use crate::errors::{Result, StoreError};
use crate::migrations::run_migrations;
use crate::repositories::entry::EntryRepo;
use crate::repositories::search::SearchRepo;
use crate::repositories::session::SessionRepo;

/// Transcript store: pooled SQLite plus the repositories, behind one
/// handle that is cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct TranscriptStore {
    pool: ConnectionPool,
}

impl TranscriptStore {
    /// Open an in-memory store. Lives as long as the handle (and clones).
    pub fn in_memory() -> Result<Self> {
        let pool = connection::new_in_memory(&ConnectionConfig::default())?;
        let conn = pool.get()?;
        run_migrations(&conn)?;
        Ok(Self { pool })
    }

    /// Open (or create) a file-backed store.
    pub fn open(path: &str, config: &ConnectionConfig) -> Result<Self> {
        let pool = connection::new_file(path, config)?;
        let conn = pool.get()?;
        run_migrations(&conn)?;
        Ok(Self { pool })
    }

    /// Ingest one entry. Duplicates of an existing identity tuple are
    /// silently skipped; returns the new id, or `None` for a duplicate.
    pub fn insert_entry(&self, entry: &NewEntry) -> Result<Option<i64>> {
        let conn = self.pool.get()?;
        EntryRepo::insert(&conn, entry)
    }

    /// Ingest a batch; returns how many rows were actually inserted.
    pub fn insert_batch(&self, entries: &[NewEntry]) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for entry in entries {
            if EntryRepo::insert(&tx, entry)?.is_some() {
                inserted += 1;
            }
        }
        tx.commit()?;
        debug!(total = entries.len(), inserted, "batch ingested");
        Ok(inserted)
    }

    /// Execute a search query. See [`SearchQuery`] for the two paths
    /// (keyword-ranked vs filter-only chronological).
    #[instrument(skip(self, query), fields(keywords = query.keywords.len()))]
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let conn = self.pool.get()?;
        SearchRepo::search(&conn, query)
    }

    /// Multi-tier fallback search over a natural-language question.
    #[instrument(skip(self, question, filter))]
    pub fn fallback_search(
        &self,
        question: &str,
        filter: &SessionFilter,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.pool.get()?;
        SearchRepo::fallback(&conn, question, filter, max_results)
    }

    /// Fetch one entry in full; unknown ids are an error here because the
    /// caller asked for that specific entry.
    pub fn read_entry(&self, id: i64) -> Result<Entry> {
        let conn = self.pool.get()?;
        EntryRepo::get(&conn, id)?.ok_or(StoreError::NotFound(id))
    }

    /// Chronological context window around one entry. Unknown ids yield an
    /// empty window.
    pub fn get_context(&self, entry_id: i64, window: usize) -> Result<Vec<Entry>> {
        let conn = self.pool.get()?;
        SearchRepo::context(&conn, entry_id, window)
    }

    /// All entries of one session, in order.
    pub fn list_entries(
        &self,
        kind: lectern_core::entry::SessionKind,
        number: u32,
    ) -> Result<Vec<Entry>> {
        let conn = self.pool.get()?;
        EntryRepo::list_for_session(&conn, kind, number)
    }

    /// Per-session summaries for the whole corpus.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let conn = self.pool.get()?;
        SessionRepo::list(&conn)
    }

    /// Per-speaker contribution counts.
    pub fn speaker_stats(&self) -> Result<Vec<SpeakerStats>> {
        let conn = self.pool.get()?;
        SessionRepo::speaker_stats(&conn)
    }

    /// Corpus-level counters.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.pool.get()?;
        SessionRepo::stats(&conn)
    }

    /// Total entry count.
    pub fn entry_count(&self) -> Result<u64> {
        let conn = self.pool.get()?;
        EntryRepo::count(&conn)
    }

    /// Drop and rebuild the FTS index from the entries table. Returns the
    /// number of rows indexed.
    pub fn rebuild_fts_index(&self) -> Result<u64> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let _ = tx.execute("DELETE FROM entries_fts", [])?;
        let indexed = tx.execute(
            "INSERT INTO entries_fts(rowid, speaker, timestamp, content)
             SELECT id, speaker, timestamp, content FROM entries",
            [],
        )?;
        tx.commit()?;
        info!(indexed, "fts index rebuilt");
        Ok(indexed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lectern_core::entry::SessionKind;
    use lectern_core::search::MAX_RESULTS;

    fn store_with_corpus() -> TranscriptStore {
        let store = TranscriptStore::in_memory().unwrap();
        let entries = vec![
            NewEntry {
                session_kind: SessionKind::Lecture,
                session_number: 1,
                speaker: "Prof".into(),
                timestamp: "00:05:00".into(),
                content: "Q-learning uses a value function".into(),
            },
            NewEntry {
                session_kind: SessionKind::Lecture,
                session_number: 1,
                speaker: "Prof".into(),
                timestamp: "00:10:00".into(),
                content: "the value function estimates expected return".into(),
            },
            NewEntry {
                session_kind: SessionKind::OfficeHours,
                session_number: 1,
                speaker: "Ana".into(),
                timestamp: "00:02:00".into(),
                content: "how do I pick a discount factor".into(),
            },
        ];
        assert_eq!(store.insert_batch(&entries).unwrap(), 3);
        store
    }

    #[test]
    fn insert_batch_skips_duplicates() {
        let store = store_with_corpus();
        let dup = NewEntry {
            session_kind: SessionKind::Lecture,
            session_number: 1,
            speaker: "Prof".into(),
            timestamp: "00:05:00".into(),
            content: "different text, same identity".into(),
        };
        assert_eq!(store.insert_batch(&[dup]).unwrap(), 0);
        assert_eq!(store.entry_count().unwrap(), 3);
    }

    #[test]
    fn search_through_facade() {
        let store = store_with_corpus();
        let results = store
            .search(&SearchQuery::with_keywords(["value"]))
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, Some(0));
    }

    #[test]
    fn fallback_search_through_facade() {
        let store = store_with_corpus();
        let results = store
            .fallback_search(
                "What does Q-learning use?",
                &SessionFilter::default(),
                MAX_RESULTS,
            )
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn read_entry_unknown_id_is_not_found() {
        let store = store_with_corpus();
        assert_matches!(store.read_entry(999), Err(StoreError::NotFound(999)));
    }

    #[test]
    fn context_and_listing() {
        let store = store_with_corpus();
        let hit = store
            .search(&SearchQuery::with_keywords(["q-learning"]))
            .unwrap();
        let window = store.get_context(hit[0].entry_id, 3).unwrap();
        assert_eq!(window.len(), 2);

        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions.len(), 2);

        let entries = store.list_entries(SessionKind::Lecture, 1).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn rebuild_fts_index_restores_search() {
        let store = store_with_corpus();
        let indexed = store.rebuild_fts_index().unwrap();
        assert_eq!(indexed, 3);

        let results = store
            .search(&SearchQuery::with_keywords(["discount"]))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(store.stats().unwrap().indexed_entries, 3);
    }

    #[test]
    fn clones_share_the_database() {
        let store = TranscriptStore::in_memory().unwrap();
        let clone = store.clone();
        let _ = store
            .insert_entry(&NewEntry {
                session_kind: SessionKind::Lecture,
                session_number: 1,
                speaker: "Prof".into(),
                timestamp: "00:01:00".into(),
                content: "shared".into(),
            })
            .unwrap();
        assert_eq!(clone.entry_count().unwrap(), 1);
    }
}
