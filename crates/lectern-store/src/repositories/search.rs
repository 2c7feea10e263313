//! Search repository — FTS5 full-text search with multi-tier fallback.
//!
//! Keyword queries are prefix matches over porter-stemmed content. Every
//! incoming keyword is widened into a variant group via
//! [`lectern_core::keywords::expand_term`]; ALL-mode requires every group to
//! match the same entry, ANY-mode at least one. Structural filters are
//! conjunctive in both modes.

use std::fmt::Write;

use lectern_core::entry::Entry;
use lectern_core::keywords;
use lectern_core::search::{MAX_RESULTS, SearchQuery, SearchResult, SessionFilter, TermMode};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use tracing::debug;

use crate::errors::{Result, StoreError};
use crate::repositories::entry::EntryRepo;

/// Search repository — stateless, every method takes `&Connection`.
pub struct SearchRepo;

impl SearchRepo {
    /// Execute a search query.
    ///
    /// Fails with [`StoreError::InvalidArgument`] when `max_results` exceeds
    /// the hard cap. With keywords, results are ranked by relevance and carry
    /// a 0-based `rank` ordinal; without keywords, filters alone select and
    /// results come back in (kind, number, timestamp) order with no rank.
    pub fn search(conn: &Connection, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        if query.max_results > MAX_RESULTS {
            return Err(StoreError::InvalidArgument(format!(
                "max_results must be at most {MAX_RESULTS}, got {}",
                query.max_results
            )));
        }

        if query.keywords.is_empty() {
            Self::filter_only_search(conn, query)
        } else {
            Self::keyword_search(conn, query)
        }
    }

    fn keyword_search(conn: &Connection, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let match_expr = build_match_expression(&query.keywords, query.mode);

        let mut sql = String::from(
            "SELECT
               e.id,
               e.session_kind,
               e.session_number,
               e.speaker,
               e.timestamp,
               snippet(entries_fts, 2, '<b>', '</b>', '...', 20) AS snippet
             FROM entries_fts
             JOIN entries e ON e.id = entries_fts.rowid
             WHERE entries_fts MATCH ?1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(match_expr)];
        push_filter_clauses(&mut sql, &mut param_values, &query.filter, "e.");

        let _ = write!(sql, " ORDER BY rank, e.id LIMIT ?{}", param_values.len() + 1);
        param_values.push(Box::new(query.max_results as i64));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(Box::as_ref).collect();
        let mut results = stmt
            .query_map(params_refs.as_slice(), map_result_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (position, result) in results.iter_mut().enumerate() {
            result.rank = Some(position);
        }
        Ok(results)
    }

    fn filter_only_search(conn: &Connection, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let mut sql = String::from(
            "SELECT
               id,
               session_kind,
               session_number,
               speaker,
               timestamp,
               substr(content, 1, 150) || '...' AS snippet
             FROM entries
             WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        push_filter_clauses(&mut sql, &mut param_values, &query.filter, "");

        let _ = write!(
            sql,
            " ORDER BY session_kind, session_number, timestamp, id LIMIT ?{}",
            param_values.len() + 1
        );
        param_values.push(Box::new(query.max_results as i64));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(Box::as_ref).collect();
        let results = stmt
            .query_map(params_refs.as_slice(), map_result_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(results)
    }

    /// Multi-tier fallback search over a natural-language question.
    ///
    /// Extracts keywords first; no keywords means an immediate empty result.
    /// Then escalates through four monotonically loosening tiers, stopping at
    /// the first non-empty one:
    ///
    /// 1. ALL keywords, filters as given
    /// 2. ANY keyword, filters as given
    /// 3. ALL keywords, whole corpus
    /// 4. ANY keyword, whole corpus
    ///
    /// Four empty tiers mean the information is absent; that is a legitimate
    /// empty result, not an error.
    pub fn fallback(
        conn: &Connection,
        question: &str,
        filter: &SessionFilter,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let extracted = keywords::extract(question);
        if extracted.is_empty() {
            return Ok(Vec::new());
        }

        let tiers = [
            (TermMode::All, filter.clone()),
            (TermMode::Any, filter.clone()),
            (TermMode::All, SessionFilter::cleared()),
            (TermMode::Any, SessionFilter::cleared()),
        ];

        for (tier, (mode, tier_filter)) in tiers.into_iter().enumerate() {
            let query = SearchQuery {
                keywords: extracted.clone(),
                mode,
                filter: tier_filter,
                max_results,
            };
            let results = Self::search(conn, &query)?;
            if !results.is_empty() {
                debug!(tier = tier + 1, hits = results.len(), "fallback tier matched");
                return Ok(results);
            }
        }

        debug!("fallback exhausted all tiers");
        Ok(Vec::new())
    }

    /// Chronological context window around one entry.
    ///
    /// Returns up to `window` entries before and after the target within the
    /// same session, clamped at session boundaries and including the target.
    /// An unknown id yields an empty sequence, not an error.
    pub fn context(conn: &Connection, entry_id: i64, window: usize) -> Result<Vec<Entry>> {
        let Some(target) = EntryRepo::get(conn, entry_id)? else {
            return Ok(Vec::new());
        };

        let session_entries =
            EntryRepo::list_for_session(conn, target.session_kind, target.session_number)?;
        let Some(index) = session_entries.iter().position(|e| e.id == entry_id) else {
            return Ok(Vec::new());
        };

        let start = index.saturating_sub(window);
        let end = session_entries
            .len()
            .min(index.saturating_add(window).saturating_add(1));
        Ok(session_entries[start..end].to_vec())
    }
}

/// Build the FTS5 MATCH expression for a keyword list.
///
/// Each keyword becomes a parenthesized group of prefix terms (the keyword
/// plus its inflection variants, OR-ed); groups are joined with AND or OR
/// according to the mode.
pub(crate) fn build_match_expression(keyword_list: &[String], mode: TermMode) -> String {
    let joiner = match mode {
        TermMode::All => " AND ",
        TermMode::Any => " OR ",
    };

    keyword_list
        .iter()
        .map(|kw| {
            let variants: Vec<String> = keywords::expand_term(&kw.to_lowercase())
                .iter()
                .map(|v| format!("\"{}\"*", v.replace('"', "\"\"")))
                .collect();
            if variants.len() == 1 {
                variants.into_iter().next().unwrap_or_default()
            } else {
                format!("({})", variants.join(" OR "))
            }
        })
        .collect::<Vec<_>>()
        .join(joiner)
}

fn push_filter_clauses(
    sql: &mut String,
    param_values: &mut Vec<Box<dyn rusqlite::types::ToSql>>,
    filter: &SessionFilter,
    prefix: &str,
) {
    if let Some(kind) = filter.session_kind {
        let _ = write!(
            sql,
            " AND {prefix}session_kind = ?{}",
            param_values.len() + 1
        );
        param_values.push(Box::new(kind.as_str().to_string()));
    }
    if let Some(number) = filter.session_number {
        let _ = write!(
            sql,
            " AND {prefix}session_number = ?{}",
            param_values.len() + 1
        );
        param_values.push(Box::new(i64::from(number)));
    }
    if let Some(speaker) = &filter.speaker {
        let _ = write!(sql, " AND {prefix}speaker LIKE ?{}", param_values.len() + 1);
        param_values.push(Box::new(format!("%{speaker}%")));
    }
    if let Some(after) = &filter.time_after {
        let _ = write!(
            sql,
            " AND {prefix}timestamp >= ?{}",
            param_values.len() + 1
        );
        param_values.push(Box::new(after.clone()));
    }
    if let Some(before) = &filter.time_before {
        let _ = write!(sql, " AND {prefix}timestamp < ?{}", param_values.len() + 1);
        param_values.push(Box::new(before.clone()));
    }
}

fn map_result_row(row: &Row<'_>) -> rusqlite::Result<SearchResult> {
    let kind_str: String = row.get(1)?;
    let session_kind = kind_str
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    Ok(SearchResult {
        entry_id: row.get(0)?,
        session_kind,
        session_number: row.get(2)?,
        speaker: row.get(3)?,
        timestamp: row.get(4)?,
        snippet: row.get(5)?,
        rank: None,
    })
}
