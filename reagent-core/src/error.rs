//! Error taxonomy for the agent execution engine.
//!
//! One `thiserror`-derived enum per protocol boundary, plus [`ReactError`]
//! which wraps all of them for the engine's public `Result`.

use thiserror::Error;

/// Upstream model/provider failure. Unrecoverable for the current call;
/// surfaced to the caller as the call's terminal failure.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model request failed outright (transport, auth, rate limit — the
    /// engine does not distinguish these; that's the Model implementor's job).
    #[error("model request failed: {0}")]
    RequestFailed(String),

    /// The model's response could not be interpreted (malformed content,
    /// formatter parse failure).
    #[error("invalid model response: {0}")]
    InvalidResponse(String),

    /// A structured-output payload could not be produced after exhausting
    /// the schema-retry budget.
    #[error("structured output schema error: {0}")]
    SchemaExhausted(#[from] SchemaError),

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

/// Tool handler failure or timeout. Captured as a text block inside the
/// `ToolResult`; does not abort the ReAct loop unless explicitly marked fatal.
#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum ToolError {
    /// No tool registered under this name.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// The handler itself returned an error.
    #[error("tool execution failed: {0}")]
    ExecutionFailed(String),

    /// Input failed schema validation before the handler ran.
    #[error("invalid tool input: {0}")]
    InvalidInput(String),

    /// The per-call deadline elapsed before the handler completed.
    #[error("tool execution timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

/// A structured-output payload failed schema validation.
#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum SchemaError {
    /// The `generate_response` tool was never called by the model.
    #[error("model did not produce a structured response")]
    NotProduced,

    /// The payload was produced but does not validate against the target schema.
    #[error("structured output failed validation: {0}")]
    Invalid(String),

    /// The retry budget (`maxSchemaRetries`) was exhausted.
    #[error("structured output retry budget ({attempts}) exhausted: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The last validation failure.
        last: String,
    },
}

/// Cancellation by user interrupt or deadline. Terminal for the call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InterruptError {
    /// The caller's deadline elapsed.
    #[error("call deadline elapsed")]
    DeadlineElapsed,

    /// The agent's interrupt flag was set mid-call.
    #[error("call interrupted: {0}")]
    Requested(String),
}

/// Invalid setup detected at construction time (fails fast, never mid-call).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two mutually exclusive structured-output targets were supplied.
    #[error("conflicting structured-output target: {0}")]
    ConflictingStructuredOutput(String),

    /// A required field was missing or invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Session persistence I/O failure, surfaced at the save/load boundary.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StateError {
    /// Key not found in the given session/field.
    #[error("not found: {session}/{field}")]
    NotFound {
        /// The session key that was searched.
        session: String,
        /// The field that was not found.
        field: String,
    },

    /// A write operation failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

/// Hook execution failure. Logged and treated as a [`ModelError`] for that
/// round unless the hook declares the failure recoverable.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook itself returned an error.
    #[error("hook failed: {0}")]
    Failed(String),

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

/// Crate-wide error returned by `Agent::call` / `Agent::call_stream`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ReactError {
    /// See [`ModelError`].
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// See [`SchemaError`], surfaced once the retry budget is exhausted.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// See [`InterruptError`].
    #[error("interrupted: {0}")]
    Interrupted(#[from] InterruptError),

    /// See [`ConfigError`].
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// See [`StateError`].
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// A hook failed in a way that was not declared recoverable.
    #[error("hook error: {0}")]
    Hook(#[from] HookError),
}
