//! Agent runtime: a bounded tool-calling loop over the transcript store.
//!
//! The model drives; the runtime supplies the tools. [`Agent`] owns the
//! conversation, dispatches decoded tool calls against
//! [`lectern_store::TranscriptStore`], and stops on a final answer, a
//! plain-text completion, or budget exhaustion.

#![deny(unsafe_code)]

pub mod agent;
pub mod errors;
pub mod llm;
pub mod registry;

pub use agent::{Agent, AgentConfig, MAX_TURNS, RunOutcome};
pub use errors::{DispatchError, LlmError, RunError};
pub use llm::openai::{OpenAiClient, OpenAiConfig};
pub use llm::{CompletionClient, CompletionOutput};
pub use registry::{ToolInvocation, ToolOutput, tool_definitions};
