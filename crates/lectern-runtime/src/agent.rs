//! Bounded tool-calling agent loop.
//!
//! One [`Agent::run`] answers one question: the model is given the registry
//! tools and at most [`MAX_TURNS`] completions to search the transcript
//! store, read entries, and submit a final answer. Endpoint failures abort
//! the run; everything a tool call can get wrong is reported back to the
//! model as tool output and the loop continues.

use std::sync::Arc;

use lectern_core::messages::{ChatMessage, FinalAnswer};
use lectern_store::TranscriptStore;
use metrics::counter;
use tracing::{debug, info, instrument, warn};

use crate::errors::RunError;
use crate::llm::CompletionClient;
use crate::registry::{ToolInvocation, tool_definitions};

/// Hard ceiling on completions per run.
pub const MAX_TURNS: usize = 10;

/// Appended to a search result after repeated empty searches.
const NO_RESULTS_NUDGE: &str = "\n\nIMPORTANT: You've searched 3+ times with no results. \
     The information is not in the database. Please provide a final answer stating this.";

/// Appended to a search result once the model has results in hand but keeps
/// searching.
const KEEP_MOVING_NUDGE: &str = "\n\nREMINDER: You've done multiple searches. If you have \
     relevant information, provide an answer now rather than continuing to search.";

fn system_prompt(max_turns: usize) -> String {
    format!(
        "You are a research assistant answering questions from a database of lecture and \
         office-hours transcripts. Use the tools to find evidence before answering:\n\
         - search_transcripts finds entries by keyword; prefer specific technical terms.\n\
         - read_entry shows one entry in full with surrounding context.\n\
         - list_sessions gives an overview of what the database contains.\n\
         - submit_final_answer ends the run; cite the entry ids you relied on.\n\n\
         If searches come up empty, broaden or rephrase your keywords. If the information \
         is genuinely not in the database, say so in your final answer instead of guessing. \
         You have at most {max_turns} turns; be economical."
    )
}

/// Loop settings.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Completion budget per run.
    pub max_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: MAX_TURNS,
        }
    }
}

/// Mutable state of one run.
#[derive(Debug, Default)]
struct ConversationState {
    messages: Vec<ChatMessage>,
    turns_used: usize,
    search_count: usize,
    read_count: usize,
    final_answer: Option<FinalAnswer>,
}

/// Outcome of one run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Structured answer, when the model terminated through the answer tool.
    /// `None` means the run ended in plain text or exhausted its budget.
    pub final_answer: Option<FinalAnswer>,
    /// The full conversation, for inspection and audit.
    pub transcript: Vec<ChatMessage>,
    /// Completions consumed.
    pub turns_used: usize,
}

/// Question-answering agent over a transcript store.
pub struct Agent {
    store: Arc<TranscriptStore>,
    client: Arc<dyn CompletionClient>,
    config: AgentConfig,
}

impl Agent {
    /// Build an agent from its two collaborators.
    pub fn new(store: Arc<TranscriptStore>, client: Arc<dyn CompletionClient>) -> Self {
        Self::with_config(store, client, AgentConfig::default())
    }

    /// Build an agent with explicit loop settings.
    pub fn with_config(
        store: Arc<TranscriptStore>,
        client: Arc<dyn CompletionClient>,
        config: AgentConfig,
    ) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    /// Answer one question.
    #[instrument(skip(self, question))]
    pub async fn run(&self, question: &str) -> Result<RunOutcome, RunError> {
        counter!("lectern_agent_runs_total").increment(1);
        let tools = tool_definitions();
        let mut state = ConversationState {
            messages: vec![
                ChatMessage::system(system_prompt(self.config.max_turns)),
                ChatMessage::user(question),
            ],
            ..Default::default()
        };

        while state.turns_used < self.config.max_turns {
            state.turns_used += 1;
            let completion = self.client.complete(&state.messages, &tools).await?;

            state.messages.push(ChatMessage::Assistant {
                content: completion.content.clone(),
                tool_calls: completion.tool_calls.clone(),
            });

            if completion.tool_calls.is_empty() {
                debug!(turn = state.turns_used, "model answered in plain text");
                break;
            }

            let mut answered = false;
            for call in &completion.tool_calls {
                counter!("lectern_agent_tool_calls_total", "tool" => call.name.clone())
                    .increment(1);

                let invocation = match ToolInvocation::decode(&call.name, &call.arguments) {
                    Ok(invocation) => invocation,
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "tool call rejected");
                        state
                            .messages
                            .push(ChatMessage::tool(&call.id, &call.name, format!("Error: {e}")));
                        continue;
                    }
                };

                // The answer tool ends the run immediately; sibling calls in
                // the same completion are never dispatched.
                if let Some(answer) = invocation.final_answer() {
                    state.final_answer = Some(answer);
                    state.messages.push(ChatMessage::tool(
                        &call.id,
                        &call.name,
                        "Final answer recorded.",
                    ));
                    answered = true;
                    break;
                }

                match invocation.dispatch(&self.store) {
                    Ok(output) => {
                        let mut content = output.content;
                        if let ToolInvocation::Search(_) = invocation {
                            state.search_count += 1;
                            if output.is_empty && state.search_count >= 3 {
                                content.push_str(NO_RESULTS_NUDGE);
                            } else if !output.is_empty && state.search_count >= 2 {
                                content.push_str(KEEP_MOVING_NUDGE);
                            }
                        } else if let ToolInvocation::ReadEntry(_) = invocation {
                            state.read_count += 1;
                        }
                        state
                            .messages
                            .push(ChatMessage::tool(&call.id, &call.name, content));
                    }
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "tool call failed");
                        state
                            .messages
                            .push(ChatMessage::tool(&call.id, &call.name, format!("Error: {e}")));
                    }
                }
            }

            if answered {
                break;
            }
        }

        info!(
            turns = state.turns_used,
            searches = state.search_count,
            reads = state.read_count,
            answered = state.final_answer.is_some(),
            "run finished"
        );

        Ok(RunOutcome {
            final_answer: state.final_answer,
            transcript: state.messages,
            turns_used: state.turns_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LlmError;
    use crate::llm::CompletionOutput;
    use crate::registry::{FINAL_ANSWER_TOOL, LIST_TOOL, SEARCH_TOOL};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use lectern_core::entry::{NewEntry, SessionKind};
    use lectern_core::messages::ToolCallRequest;
    use lectern_core::tools::ToolDefinition;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Plays back a fixed sequence of completions (or failures).
    struct ScriptedClient {
        steps: Mutex<VecDeque<Result<CompletionOutput, LlmError>>>,
    }

    impl ScriptedClient {
        fn new(steps: Vec<Result<CompletionOutput, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _tools: &[ToolDefinition],
        ) -> Result<CompletionOutput, LlmError> {
            self.steps
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("script exhausted"))
        }
    }

    fn text(content: &str) -> Result<CompletionOutput, LlmError> {
        Ok(CompletionOutput {
            content: Some(content.into()),
            tool_calls: vec![],
        })
    }

    fn calls(tool_calls: Vec<(&str, &str, &str)>) -> Result<CompletionOutput, LlmError> {
        Ok(CompletionOutput {
            content: None,
            tool_calls: tool_calls
                .into_iter()
                .map(|(id, name, args)| ToolCallRequest {
                    id: id.into(),
                    name: name.into(),
                    arguments: args.into(),
                })
                .collect(),
        })
    }

    fn store_with_corpus() -> Arc<TranscriptStore> {
        let store = TranscriptStore::in_memory().unwrap();
        let _ = store
            .insert_entry(&NewEntry {
                session_kind: SessionKind::Lecture,
                session_number: 1,
                speaker: "Prof".into(),
                timestamp: "00:05:00".into(),
                content: "Q-learning uses a value function".into(),
            })
            .unwrap();
        Arc::new(store)
    }

    fn tool_messages(transcript: &[ChatMessage]) -> Vec<(&str, &str)> {
        transcript
            .iter()
            .filter_map(|m| match m {
                ChatMessage::Tool { name, content, .. } => Some((name.as_str(), content.as_str())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn plain_text_completion_ends_the_run() {
        let agent = Agent::new(
            store_with_corpus(),
            ScriptedClient::new(vec![text("I don't need tools for this.")]),
        );
        let outcome = agent.run("hello?").await.unwrap();
        assert!(outcome.final_answer.is_none());
        assert_eq!(outcome.turns_used, 1);
    }

    #[tokio::test]
    async fn final_answer_ends_the_run_and_skips_siblings() {
        let agent = Agent::new(
            store_with_corpus(),
            ScriptedClient::new(vec![calls(vec![
                (
                    "tc_1",
                    FINAL_ANSWER_TOOL,
                    "{\"answer\": \"A value function.\", \"source_entry_ids\": [1]}",
                ),
                ("tc_2", SEARCH_TOOL, "{\"keywords\": [\"value\"]}"),
            ])]),
        );
        let outcome = agent.run("What does Q-learning use?").await.unwrap();

        let answer = outcome.final_answer.unwrap();
        assert_eq!(answer.answer, "A value function.");
        assert_eq!(answer.source_entry_ids, vec![1]);
        assert_eq!(outcome.turns_used, 1);

        // The sibling search after the answer was never dispatched.
        let tools = tool_messages(&outcome.transcript);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0], (FINAL_ANSWER_TOOL, "Final answer recorded."));
    }

    #[tokio::test]
    async fn budget_exhaustion_stops_at_max_turns() {
        let script = (0..MAX_TURNS + 5)
            .map(|i| {
                calls(vec![(
                    &format!("tc_{i}")[..],
                    SEARCH_TOOL,
                    "{\"keywords\": [\"value\"]}",
                )])
            })
            .collect();
        let agent = Agent::new(store_with_corpus(), ScriptedClient::new(script));
        let outcome = agent.run("keep searching forever").await.unwrap();
        assert_eq!(outcome.turns_used, MAX_TURNS);
        assert!(outcome.final_answer.is_none());
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_and_recoverable() {
        let agent = Agent::new(
            store_with_corpus(),
            ScriptedClient::new(vec![
                calls(vec![("tc_1", "drop_tables", "{}")]),
                text("Giving up on that tool."),
            ]),
        );
        let outcome = agent.run("q").await.unwrap();
        assert_eq!(outcome.turns_used, 2);

        let tools = tool_messages(&outcome.transcript);
        assert_eq!(tools.len(), 1);
        assert!(tools[0].1.starts_with("Error: unknown tool"));
    }

    #[tokio::test]
    async fn invalid_arguments_are_reported_and_recoverable() {
        let agent = Agent::new(
            store_with_corpus(),
            ScriptedClient::new(vec![
                calls(vec![("tc_1", "read_entry", "{\"entry_id\": \"seven\"}")]),
                text("ok"),
            ]),
        );
        let outcome = agent.run("q").await.unwrap();
        let tools = tool_messages(&outcome.transcript);
        assert!(tools[0].1.starts_with("Error: invalid arguments for read_entry"));
    }

    #[tokio::test]
    async fn repeated_empty_searches_trigger_the_absence_nudge() {
        let search = "{\"keywords\": [\"zzzmissing\"]}";
        let agent = Agent::new(
            store_with_corpus(),
            ScriptedClient::new(vec![
                calls(vec![("tc_1", SEARCH_TOOL, search)]),
                calls(vec![("tc_2", SEARCH_TOOL, search)]),
                calls(vec![("tc_3", SEARCH_TOOL, search)]),
                text("Not in the database."),
            ]),
        );
        let outcome = agent.run("q").await.unwrap();

        let tools = tool_messages(&outcome.transcript);
        assert_eq!(tools.len(), 3);
        assert!(!tools[0].1.contains("IMPORTANT:"));
        assert!(!tools[1].1.contains("IMPORTANT:"));
        assert!(tools[2].1.contains("IMPORTANT: You've searched 3+ times"));
    }

    #[tokio::test]
    async fn productive_repeat_searches_trigger_the_answer_nudge() {
        let search = "{\"keywords\": [\"value\"]}";
        let agent = Agent::new(
            store_with_corpus(),
            ScriptedClient::new(vec![
                calls(vec![("tc_1", SEARCH_TOOL, search)]),
                calls(vec![("tc_2", SEARCH_TOOL, search)]),
                text("done"),
            ]),
        );
        let outcome = agent.run("q").await.unwrap();

        let tools = tool_messages(&outcome.transcript);
        assert!(!tools[0].1.contains("REMINDER:"));
        assert!(tools[1].1.contains("REMINDER: You've done multiple searches"));
    }

    #[tokio::test]
    async fn non_search_tools_do_not_consume_search_nudges() {
        let agent = Agent::new(
            store_with_corpus(),
            ScriptedClient::new(vec![
                calls(vec![("tc_1", LIST_TOOL, "{}")]),
                calls(vec![("tc_2", SEARCH_TOOL, "{\"keywords\": [\"value\"]}")]),
                text("done"),
            ]),
        );
        let outcome = agent.run("q").await.unwrap();

        let tools = tool_messages(&outcome.transcript);
        // First search overall, so no reminder yet.
        assert!(!tools[1].1.contains("REMINDER:"));
    }

    #[tokio::test]
    async fn endpoint_failure_is_fatal() {
        let agent = Agent::new(
            store_with_corpus(),
            ScriptedClient::new(vec![Err(LlmError::Api {
                status: 500,
                message: "boom".into(),
            })]),
        );
        let err = agent.run("q").await.unwrap_err();
        assert_matches!(err, RunError::Endpoint(LlmError::Api { status: 500, .. }));
    }
}
