//! Hook event types.
//!
//! Each event carries the agent name, the model name and effective
//! generation options for the in-flight round, and event-specific payload.
//! Hooks mutate fields in place; the engine inspects the post-dispatch
//! event to decide whether to retry, skip a tool, or substitute output.

use reagent_core::{ContentBlock, GenerateOptions, Msg};

/// Identifies which point in the ReAct loop an event was raised at, used
/// to filter which hooks a [`crate::HookBus`] dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Before the model is called.
    PreReasoning,
    /// Once per streamed delta during a model call.
    ReasoningChunk,
    /// After the model call completes and the assistant message is
    /// accumulated.
    PostReasoning,
    /// Before any tool in the current assistant turn is invoked.
    PreActing,
    /// After all tools in the current assistant turn have been invoked.
    PostActing,
    /// Before a single tool invocation.
    PreTool,
    /// After a single tool invocation.
    PostTool,
}

/// Raised before the formatter/model call. Hooks may append to `messages`
/// (the plan hint hook does this) or override `options`.
#[derive(Debug, Clone)]
pub struct PreReasoningEvent {
    /// Name of the agent making the call.
    pub agent_name: String,
    /// Model identifier the engine is about to call.
    pub model_name: String,
    /// Effective generation options for this round; hooks may replace.
    pub options: GenerateOptions,
    /// Messages about to be sent, in order. Hooks may push additional
    /// hint messages onto the end.
    pub messages: Vec<Msg>,
}

/// Raised once per streamed delta. Observational; `delta` and
/// `accumulated` are not mutated by hooks in this implementation, but the
/// event carries both so a stream-sink hook can choose incremental vs
/// cumulative emission per `StreamOptions`.
#[derive(Debug, Clone)]
pub struct ReasoningChunkEvent {
    /// Name of the agent making the call.
    pub agent_name: String,
    /// The incremental delta just received from the model.
    pub delta: ContentBlock,
    /// The message accumulated so far, including `delta`.
    pub accumulated: Msg,
}

/// Raised after a model round completes.
///
/// A hook may request the engine loop back to REASON without advancing to
/// ACT/FINISH by setting `goto_reasoning_requested = true` and pushing the
/// messages it wants injected onto `injected_messages`. It may also
/// override the options for that retry round via `next_options`.
#[derive(Debug, Clone)]
pub struct PostReasoningEvent {
    /// Name of the agent making the call.
    pub agent_name: String,
    /// Model identifier that was called.
    pub model_name: String,
    /// Generation options that were in effect for this round.
    pub options: GenerateOptions,
    /// The assistant message accumulated from the model's response.
    pub assistant_msg: Msg,
    /// Set by a hook to request a REASON retry instead of advancing.
    pub goto_reasoning_requested: bool,
    /// Messages to inject if `goto_reasoning_requested` is set.
    pub injected_messages: Vec<Msg>,
    /// Generation options to use on the retry round, if any.
    pub next_options: Option<GenerateOptions>,
}

/// Raised before any tool in the current assistant turn executes.
#[derive(Debug, Clone)]
pub struct PreActingEvent {
    /// Name of the agent acting.
    pub agent_name: String,
    /// The `ToolUse` blocks about to be dispatched, in input order.
    pub tool_calls: Vec<ContentBlock>,
}

/// Raised after all tools in the current assistant turn have completed.
#[derive(Debug, Clone)]
pub struct PostActingEvent {
    /// Name of the agent that acted.
    pub agent_name: String,
    /// The `ToolResult` blocks produced, in input order.
    pub tool_results: Vec<ContentBlock>,
}

/// Raised before one tool invocation. A hook may set `skip = true` (with
/// `skip_reason`) to bypass the handler entirely, or set `override_input`
/// to replace the arguments passed to the handler.
#[derive(Debug, Clone)]
pub struct PreToolEvent {
    /// Name of the agent acting.
    pub agent_name: String,
    /// The tool about to be invoked.
    pub tool_name: String,
    /// The input the model supplied.
    pub tool_input: serde_json::Value,
    /// Set by a hook to bypass execution.
    pub skip: bool,
    /// Human-readable reason recorded as the tool's result text when skipped.
    pub skip_reason: Option<String>,
    /// Set by a hook to replace the handler's input.
    pub override_input: Option<serde_json::Value>,
}

/// Raised after one tool invocation. A hook may set `override_output` to
/// replace what gets recorded in the `ToolResult` block.
#[derive(Debug, Clone)]
pub struct PostToolEvent {
    /// Name of the agent acting.
    pub agent_name: String,
    /// The tool that was invoked.
    pub tool_name: String,
    /// The content blocks the handler (or timeout/error path) produced.
    pub tool_output: Vec<ContentBlock>,
    /// Set by a hook to replace `tool_output`.
    pub override_output: Option<Vec<ContentBlock>>,
}

/// The full set of events dispatchable through a [`crate::HookBus`].
#[derive(Debug, Clone)]
pub enum HookEvent {
    /// See [`PreReasoningEvent`].
    PreReasoning(PreReasoningEvent),
    /// See [`ReasoningChunkEvent`].
    ReasoningChunk(ReasoningChunkEvent),
    /// See [`PostReasoningEvent`].
    PostReasoning(PostReasoningEvent),
    /// See [`PreActingEvent`].
    PreActing(PreActingEvent),
    /// See [`PostActingEvent`].
    PostActing(PostActingEvent),
    /// See [`PreToolEvent`].
    PreTool(PreToolEvent),
    /// See [`PostToolEvent`].
    PostTool(PostToolEvent),
}

impl HookEvent {
    /// The [`HookPoint`] this event was raised at.
    pub fn point(&self) -> HookPoint {
        match self {
            HookEvent::PreReasoning(_) => HookPoint::PreReasoning,
            HookEvent::ReasoningChunk(_) => HookPoint::ReasoningChunk,
            HookEvent::PostReasoning(_) => HookPoint::PostReasoning,
            HookEvent::PreActing(_) => HookPoint::PreActing,
            HookEvent::PostActing(_) => HookPoint::PostActing,
            HookEvent::PreTool(_) => HookPoint::PreTool,
            HookEvent::PostTool(_) => HookPoint::PostTool,
        }
    }
}
