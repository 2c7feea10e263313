//! Transcript entries and session aggregates.
//!
//! An [`Entry`] is one timestamped utterance by a speaker within a session
//! (a lecture or an office-hours occurrence). Entries are created once during
//! ingestion and are immutable afterwards; the tuple
//! (kind, number, timestamp, speaker) is unique across the corpus.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two session categories a transcript entry can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    /// A numbered lecture.
    #[serde(rename = "lecture")]
    Lecture,
    /// A numbered office-hours session.
    #[serde(rename = "officehours")]
    OfficeHours,
}

impl SessionKind {
    /// Wire string used in the database and tool payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lecture => "lecture",
            Self::OfficeHours => "officehours",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown session kind string.
#[derive(Debug, thiserror::Error)]
#[error("unknown session kind: {0:?} (expected \"lecture\" or \"officehours\")")]
pub struct ParseSessionKindError(pub String);

impl FromStr for SessionKind {
    type Err = ParseSessionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lecture" => Ok(Self::Lecture),
            "officehours" => Ok(Self::OfficeHours),
            other => Err(ParseSessionKindError(other.to_string())),
        }
    }
}

/// One timestamped utterance within a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Store-assigned identifier, unique and monotonic per insertion.
    pub id: i64,
    /// Session category.
    pub session_kind: SessionKind,
    /// Session number within its category.
    pub session_number: u32,
    /// Speaker name (non-empty).
    pub speaker: String,
    /// Timestamp in `HH:MM:SS`; lexical order equals temporal order.
    pub timestamp: String,
    /// Utterance text (non-empty).
    pub content: String,
}

/// A not-yet-persisted entry, as handed to the store by ingestion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    /// Session category.
    pub session_kind: SessionKind,
    /// Session number within its category.
    pub session_number: u32,
    /// Speaker name.
    pub speaker: String,
    /// Timestamp in `HH:MM:SS`.
    pub timestamp: String,
    /// Utterance text.
    pub content: String,
}

/// Aggregate view of one session, derived from its entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session category.
    pub session_kind: SessionKind,
    /// Session number.
    pub session_number: u32,
    /// Number of entries in the session.
    pub entry_count: u64,
    /// Timestamp of the earliest entry.
    pub start_time: String,
    /// Timestamp of the latest entry.
    pub end_time: String,
    /// Number of distinct speakers.
    pub speaker_count: u64,
}

/// Per-speaker corpus statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerStats {
    /// Speaker name.
    pub speaker: String,
    /// Total entries by this speaker.
    pub entry_count: u64,
    /// Distinct sessions the speaker appears in.
    pub session_count: u64,
}

/// Corpus-wide statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total entries.
    pub total_entries: u64,
    /// Entries in lecture sessions.
    pub lecture_entries: u64,
    /// Entries in office-hours sessions.
    pub officehours_entries: u64,
    /// Distinct (kind, number) sessions.
    pub unique_sessions: u64,
    /// Distinct speakers.
    pub unique_speakers: u64,
    /// Rows currently in the full-text index.
    pub indexed_entries: u64,
}
