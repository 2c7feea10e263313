//! Tool registry — the executable half of the tool surface.
//!
//! [`ToolInvocation`] is a closed enum: the model can only ever name one of
//! the four registered tools, and each variant carries typed, already-decoded
//! arguments. Decoding happens here so a malformed payload surfaces as a
//! per-call [`DispatchError`] the agent can report back to the model.

use lectern_core::entry::{Entry, SessionKind};
use lectern_core::messages::FinalAnswer;
use lectern_core::search::{MAX_RESULTS, SearchQuery, SessionFilter, TermMode};
use lectern_core::tools::{ToolDefinition, ToolSchemaBuilder};
use lectern_store::TranscriptStore;
use serde::Deserialize;
use serde_json::json;

use crate::errors::DispatchError;

/// Name of the search tool.
pub const SEARCH_TOOL: &str = "search_transcripts";
/// Name of the entry-read tool.
pub const READ_TOOL: &str = "read_entry";
/// Name of the session-listing tool.
pub const LIST_TOOL: &str = "list_sessions";
/// Name of the termination tool.
pub const FINAL_ANSWER_TOOL: &str = "submit_final_answer";

/// Default context window for [`READ_TOOL`].
const DEFAULT_CONTEXT_WINDOW: usize = 2;

/// Arguments of [`SEARCH_TOOL`]. Unknown fields are ignored rather than
/// rejected; models pad argument objects routinely.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchArgs {
    /// Keywords to search for. Empty or absent means filter-only.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Match any keyword instead of requiring all.
    #[serde(default)]
    pub match_any: bool,
    /// Restrict to one session category.
    pub session_kind: Option<SessionKind>,
    /// Restrict to one session number.
    pub session_number: Option<u32>,
    /// Substring match on speaker name.
    pub speaker: Option<String>,
    /// Inclusive lower timestamp bound.
    pub time_after: Option<String>,
    /// Exclusive upper timestamp bound.
    pub time_before: Option<String>,
    /// Result cap; the store rejects values above the hard limit.
    pub max_results: Option<usize>,
}

/// Arguments of [`READ_TOOL`].
#[derive(Clone, Debug, Deserialize)]
pub struct ReadEntryArgs {
    /// Id of the entry to read.
    pub entry_id: i64,
    /// Entries of surrounding context on each side.
    pub context_window: Option<usize>,
}

/// Arguments of [`FINAL_ANSWER_TOOL`].
#[derive(Clone, Debug, Deserialize)]
pub struct FinalAnswerArgs {
    /// The answer text.
    pub answer: String,
    /// Entry ids cited as evidence.
    #[serde(default)]
    pub source_entry_ids: Vec<i64>,
}

/// Rendered output of one dispatched tool call.
#[derive(Clone, Debug)]
pub struct ToolOutput {
    /// Text handed back to the model as the tool message.
    pub content: String,
    /// True when the call found nothing (drives the agent's nudges).
    pub is_empty: bool,
}

/// One decoded tool call, ready to dispatch.
#[derive(Clone, Debug)]
pub enum ToolInvocation {
    /// Keyword/filter search over the corpus.
    Search(SearchArgs),
    /// Full read of one entry plus surrounding context.
    ReadEntry(ReadEntryArgs),
    /// Per-session corpus overview.
    ListSessions,
    /// Terminal answer submission.
    FinalAnswer(FinalAnswerArgs),
}

impl ToolInvocation {
    /// Decode a named tool call from its raw JSON argument string.
    pub fn decode(name: &str, raw_arguments: &str) -> Result<Self, DispatchError> {
        let invalid = |reason: serde_json::Error| DispatchError::InvalidArguments {
            tool: name.to_string(),
            reason: reason.to_string(),
        };
        match name {
            SEARCH_TOOL => {
                let args = serde_json::from_str(raw_arguments).map_err(invalid)?;
                Ok(Self::Search(args))
            }
            READ_TOOL => {
                let args = serde_json::from_str(raw_arguments).map_err(invalid)?;
                Ok(Self::ReadEntry(args))
            }
            LIST_TOOL => Ok(Self::ListSessions),
            FINAL_ANSWER_TOOL => {
                let args = serde_json::from_str(raw_arguments).map_err(invalid)?;
                Ok(Self::FinalAnswer(args))
            }
            other => Err(DispatchError::UnknownTool(other.to_string())),
        }
    }

    /// The final answer payload, when this call is the termination tool.
    pub fn final_answer(&self) -> Option<FinalAnswer> {
        match self {
            Self::FinalAnswer(args) => Some(FinalAnswer {
                answer: args.answer.clone(),
                source_entry_ids: args.source_entry_ids.clone(),
            }),
            _ => None,
        }
    }

    /// Execute this call against the store.
    pub fn dispatch(&self, store: &TranscriptStore) -> Result<ToolOutput, DispatchError> {
        match self {
            Self::Search(args) => {
                let query = SearchQuery {
                    keywords: args.keywords.clone(),
                    mode: if args.match_any {
                        TermMode::Any
                    } else {
                        TermMode::All
                    },
                    filter: SessionFilter {
                        session_kind: args.session_kind,
                        session_number: args.session_number,
                        speaker: args.speaker.clone(),
                        time_after: args.time_after.clone(),
                        time_before: args.time_before.clone(),
                    },
                    max_results: args.max_results.unwrap_or(MAX_RESULTS),
                };
                let results = store.search(&query)?;
                if results.is_empty() {
                    Ok(ToolOutput {
                        content: "No results found.".to_string(),
                        is_empty: true,
                    })
                } else {
                    Ok(ToolOutput {
                        content: serde_json::to_string_pretty(&results)?,
                        is_empty: false,
                    })
                }
            }
            Self::ReadEntry(args) => {
                let entry = store.read_entry(args.entry_id)?;
                let window = args.context_window.unwrap_or(DEFAULT_CONTEXT_WINDOW);
                let context: Vec<Entry> = store
                    .get_context(args.entry_id, window)?
                    .into_iter()
                    .filter(|e| e.id != args.entry_id)
                    .collect();
                let rendered = json!({"entry": entry, "context": context});
                Ok(ToolOutput {
                    content: serde_json::to_string_pretty(&rendered)?,
                    is_empty: false,
                })
            }
            Self::ListSessions => {
                let sessions = store.list_sessions()?;
                if sessions.is_empty() {
                    Ok(ToolOutput {
                        content: "No sessions in the database.".to_string(),
                        is_empty: true,
                    })
                } else {
                    Ok(ToolOutput {
                        content: serde_json::to_string_pretty(&sessions)?,
                        is_empty: false,
                    })
                }
            }
            Self::FinalAnswer(_) => Ok(ToolOutput {
                content: "Final answer recorded.".to_string(),
                is_empty: false,
            }),
        }
    }
}

/// Tool definitions advertised to the endpoint, one per registry variant.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolSchemaBuilder::new(
            SEARCH_TOOL,
            "Search the lecture and office-hours transcripts. Provide specific keywords \
             (concepts, technical terms); all keywords must match unless match_any is set. \
             Optional filters narrow by session, speaker, or timestamp range. Returns up to \
             10 matching entries with highlighted snippets.",
        )
        .property(
            "keywords",
            json!({"type": "array", "items": {"type": "string"},
                   "description": "Search terms. Omit to browse by filters alone."}),
        )
        .property(
            "match_any",
            json!({"type": "boolean",
                   "description": "Match entries containing any keyword instead of all."}),
        )
        .property(
            "session_kind",
            json!({"type": "string", "enum": ["lecture", "officehours"],
                   "description": "Restrict to one session category."}),
        )
        .property(
            "session_number",
            json!({"type": "integer", "description": "Restrict to one session number."}),
        )
        .property(
            "speaker",
            json!({"type": "string", "description": "Substring match on speaker name."}),
        )
        .property(
            "time_after",
            json!({"type": "string", "description": "Inclusive lower bound, HH:MM:SS."}),
        )
        .property(
            "time_before",
            json!({"type": "string", "description": "Exclusive upper bound, HH:MM:SS."}),
        )
        .property(
            "max_results",
            json!({"type": "integer", "description": "Result cap, at most 10."}),
        )
        .build(),
        ToolSchemaBuilder::new(
            READ_TOOL,
            "Read one transcript entry in full, by id, together with the surrounding \
             entries from the same session for context.",
        )
        .required_property("entry_id", json!({"type": "integer"}))
        .property(
            "context_window",
            json!({"type": "integer",
                   "description": "Context entries on each side (default 2)."}),
        )
        .build(),
        ToolSchemaBuilder::new(
            LIST_TOOL,
            "List every session in the database with its entry count, time range, and \
             number of distinct speakers. Useful for orienting before searching.",
        )
        .build(),
        ToolSchemaBuilder::new(
            FINAL_ANSWER_TOOL,
            "Submit the final answer and end the run. Call this exactly once, when you \
             have enough information (or have established the information is absent).",
        )
        .required_property("answer", json!({"type": "string"}))
        .property(
            "source_entry_ids",
            json!({"type": "array", "items": {"type": "integer"},
                   "description": "Ids of entries the answer is based on."}),
        )
        .build(),
    ]
}
