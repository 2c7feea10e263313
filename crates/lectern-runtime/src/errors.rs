//! Runtime error taxonomy.
//!
//! Endpoint failures abort the run; everything a tool call can get wrong is a
//! [`DispatchError`], which the agent converts into an `Error: ...` tool
//! message and lets the model recover from.

use lectern_store::StoreError;

/// Failures talking to the completion endpoint.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned a non-success status.
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },

    /// Endpoint returned 2xx but the payload was not a usable completion.
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Failures dispatching one tool call. All of these are recoverable: the
/// agent reports them back to the model as tool output.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The model invoked a tool name nothing registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not decode against the tool's schema.
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Tool whose arguments failed to decode.
        tool: String,
        /// Decode failure detail.
        reason: String,
    },

    /// The store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Tool output could not be rendered to JSON.
    #[error("failed to render tool output: {0}")]
    Render(#[from] serde_json::Error),
}

/// Fatal failures of a whole agent run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The completion endpoint failed; without it the loop cannot continue.
    #[error(transparent)]
    Endpoint(#[from] LlmError),
}
