//! Search query and result types.
//!
//! A [`SearchQuery`] is a request value: optional keywords, a combination
//! mode, optional structural filters, and a result cap. The hard cap is
//! [`MAX_RESULTS`]; the store rejects (not truncates) anything above it.

use serde::{Deserialize, Serialize};

use crate::entry::SessionKind;

/// Hard ceiling on results per search. Requests above this are rejected.
pub const MAX_RESULTS: usize = 10;

/// How multiple keywords combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermMode {
    /// Every keyword group must match the same entry.
    #[default]
    All,
    /// At least one keyword group must match.
    Any,
}

/// Structural filters applied conjunctively on top of keyword matching.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    /// Restrict to one session category.
    pub session_kind: Option<SessionKind>,
    /// Restrict to one session number.
    pub session_number: Option<u32>,
    /// Substring match on speaker name.
    pub speaker: Option<String>,
    /// Inclusive lower timestamp bound (`HH:MM:SS`).
    pub time_after: Option<String>,
    /// Exclusive upper timestamp bound (`HH:MM:SS`).
    pub time_before: Option<String>,
}

impl SessionFilter {
    /// True when no filter field is set.
    pub fn is_empty(&self) -> bool {
        self.session_kind.is_none()
            && self.session_number.is_none()
            && self.speaker.is_none()
            && self.time_after.is_none()
            && self.time_before.is_none()
    }

    /// Copy of this filter with only the session scope kept.
    ///
    /// Used by fallback escalation, which widens by dropping scope entirely;
    /// speaker/time bounds never survive into the global tiers either.
    pub fn cleared() -> Self {
        Self::default()
    }
}

/// A full search request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Keywords to match as prefix terms. Empty means filter-only search.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Combination mode for multiple keywords.
    #[serde(default)]
    pub mode: TermMode,
    /// Structural filters.
    #[serde(default)]
    pub filter: SessionFilter,
    /// Result cap, at most [`MAX_RESULTS`].
    pub max_results: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            mode: TermMode::All,
            filter: SessionFilter::default(),
            max_results: MAX_RESULTS,
        }
    }
}

impl SearchQuery {
    /// Keyword query with default mode, no filters, and the default cap.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// A projection over one matching entry, constructed per query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Id of the matching entry.
    pub entry_id: i64,
    /// Session category of the entry.
    pub session_kind: SessionKind,
    /// Session number of the entry.
    pub session_number: u32,
    /// Speaker name.
    pub speaker: String,
    /// Entry timestamp.
    pub timestamp: String,
    /// Content excerpt with `<b>`/`</b>` highlight markers (full-text path)
    /// or a plain content prefix (filter-only path).
    pub snippet: String,
    /// 0-based relevance ordinal. Present only for full-text matches;
    /// filter-only results are chronological and carry no rank.
    pub rank: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_uses_hard_cap() {
        let q = SearchQuery::default();
        assert_eq!(q.max_results, MAX_RESULTS);
        assert_eq!(q.mode, TermMode::All);
        assert!(q.keywords.is_empty());
        assert!(q.filter.is_empty());
    }

    #[test]
    fn with_keywords_builder() {
        let q = SearchQuery::with_keywords(["policy", "gradient"]);
        assert_eq!(q.keywords, vec!["policy", "gradient"]);
    }

    #[test]
    fn filter_is_empty_detects_any_field() {
        let mut f = SessionFilter::default();
        assert!(f.is_empty());
        f.speaker = Some("Prof".into());
        assert!(!f.is_empty());
    }

    #[test]
    fn term_mode_serde() {
        assert_eq!(serde_json::to_string(&TermMode::Any).unwrap(), "\"any\"");
        let mode: TermMode = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(mode, TermMode::All);
    }
}
