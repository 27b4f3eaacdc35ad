//! Static configuration for an [`crate::Agent`].
//!
//! Primitive settings live here, `Default`-able field by field; the
//! collaborators an agent is built from (model, toolkit, hooks, memory)
//! are passed directly to [`crate::Agent::new`] instead of folded into
//! this struct, matching the same split `reagent_react::EngineConfig`
//! already draws between static config and collaborators.

use crate::state::StatePersistence;
use reagent_core::GenerateOptions;
use reagent_structured::StructuredOutputMode;
use std::time::Duration;

/// Construction-time configuration for an [`crate::Agent`].
///
/// Built with explicit field defaults via [`Default`], not a builder chain:
/// a caller overrides only the fields it cares about with struct-update
/// syntax (`AgentConfig { name: "researcher".into(), ..Default::default() }`).
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Agent identifier, used for hook/log attribution and as `Msg::name`
    /// on messages this agent authors.
    pub name: String,
    /// Short human-readable description, persisted in `agent_meta`.
    pub description: String,
    /// System prompt, seeded as the first (`Role::System`) message in a
    /// freshly constructed agent's memory.
    pub system_prompt: String,
    /// Model identifier passed to the Model interface and recorded on
    /// hook events; has no bearing on which `Model` is actually called.
    pub model_name: String,
    /// Maximum REASON/ACT round-trips before falling back to SUMMARIZE.
    pub max_iters: u32,
    /// Per-tool-invocation timeout.
    pub tool_timeout: Duration,
    /// Bounded channel capacity for `call_stream`'s event sink.
    pub stream_capacity: usize,
    /// How the structured-output coordinator nudges the model toward
    /// `generate_response`. Only meaningful when `target_schema` is set.
    pub structured_output_mode: StructuredOutputMode,
    /// JSON Schema the terminal message's structured payload must satisfy.
    /// `None` disables structured-output coordination entirely.
    pub target_schema: Option<serde_json::Value>,
    /// Retries before a structured-output failure is surfaced as an error.
    pub max_schema_retries: u32,
    /// Enables the plan notebook with this cap on subtasks per plan.
    /// `None` disables the plan notebook and its four tools.
    pub plan_max_subtasks: Option<usize>,
    /// What gets persisted on `StateModule::save_to`/restored on `load_from`.
    pub state_persistence: StatePersistence,
    /// Generation options applied to every round unless a hook overrides them.
    pub default_options: GenerateOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            system_prompt: String::new(),
            model_name: String::new(),
            max_iters: 10,
            tool_timeout: Duration::from_secs(30),
            stream_capacity: 64,
            structured_output_mode: StructuredOutputMode::ToolChoice,
            target_schema: None,
            max_schema_retries: 2,
            plan_max_subtasks: None,
            state_persistence: StatePersistence::all(),
            default_options: GenerateOptions::default(),
        }
    }
}
