//! Structured-output coordination.
//!
//! An agent configured for structured output exposes a synthetic
//! `generate_response` tool whose single argument must match a
//! caller-supplied JSON Schema. The coordinator decides, round by round,
//! whether that call is still required, forces it via `tool_choice` when
//! the mode calls for it, and turns a missing or invalid call into a
//! reminder message rather than failing the whole turn outright.

use crate::schema;
use reagent_core::{ContentBlock, GenerateOptions, Msg, SchemaError, ToolChoice, ToolCallId};
use serde_json::{json, Value};

/// Name of the synthetic tool the coordinator injects.
pub const GENERATE_RESPONSE_TOOL: &str = "generate_response";

/// Metadata key marking a message as a structured-output reminder.
pub const STRUCTURED_OUTPUT_REMINDER: &str = "STRUCTURED_OUTPUT_REMINDER";
/// Metadata key recording which reminder mode produced the message.
pub const STRUCTURED_OUTPUT_REMINDER_TYPE: &str = "STRUCTURED_OUTPUT_REMINDER_TYPE";
/// Metadata key excluding a reminder from multi-agent history merges.
pub const BYPASS_MULTIAGENT_HISTORY_MERGE: &str = "BYPASS_MULTIAGENT_HISTORY_MERGE";

/// How the coordinator nudges the model toward calling `generate_response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredOutputMode {
    /// Force `tool_choice` to `generate_response` once a round has failed
    /// to produce a valid call.
    ToolChoice,
    /// Never force `tool_choice`; rely entirely on an appended reminder
    /// message asking the model to call the tool.
    Prompt,
}

impl StructuredOutputMode {
    fn as_str(self) -> &'static str {
        match self {
            StructuredOutputMode::ToolChoice => "TOOL_CHOICE",
            StructuredOutputMode::Prompt => "PROMPT",
        }
    }
}

/// Outcome of inspecting one round's assistant message for the structured
/// payload.
#[derive(Debug)]
pub enum StructuredOutputOutcome {
    /// No structured payload was required of this round at all (the
    /// coordinator is idle, or a previous round already satisfied it).
    NotApplicable,
    /// `generate_response` was called with a payload matching the schema.
    Satisfied(Value),
    /// The round still owes a structured payload; retry budget remains.
    /// `reminder` should be appended to the transcript before looping
    /// back to reasoning.
    Retry { reminder: Msg },
    /// The retry budget is exhausted.
    Exhausted(SchemaError),
}

/// Tracks retry state for one in-flight `call()`/`call_stream()` turn.
///
/// Not `Send`-shared: one coordinator instance belongs to a single
/// in-flight turn, serialized behind the engine's per-agent lock like
/// everything else it owns.
pub struct StructuredOutputCoordinator {
    mode: StructuredOutputMode,
    target_schema: Value,
    max_retries: u32,
    attempts: u32,
    needs_retry: bool,
}

impl StructuredOutputCoordinator {
    /// Build a coordinator targeting `target_schema`, allowing up to
    /// `max_retries` reminder rounds before giving up.
    pub fn new(mode: StructuredOutputMode, target_schema: Value, max_retries: u32) -> Self {
        Self {
            mode,
            target_schema,
            max_retries,
            attempts: 0,
            needs_retry: false,
        }
    }

    /// Default retry budget (two reminder rounds) used when an agent
    /// doesn't override it.
    pub const DEFAULT_MAX_RETRIES: u32 = 2;

    /// JSON Schema for the synthetic tool: a single `response` parameter
    /// constrained by `target_schema`.
    pub fn synthetic_tool_schema(&self) -> Value {
        json!({
            "name": GENERATE_RESPONSE_TOOL,
            "description": "Produce the final structured response for this turn.",
            "input_schema": {
                "type": "object",
                "properties": { "response": self.target_schema.clone() },
                "required": ["response"]
            }
        })
    }

    /// Overlay applied to the caller's `GenerateOptions` before the next
    /// reasoning round. Only forces `tool_choice` in `ToolChoice` mode,
    /// and only once a round has already failed to produce a valid call.
    pub fn before_round(&self, base: &GenerateOptions) -> GenerateOptions {
        if self.needs_retry && self.mode == StructuredOutputMode::ToolChoice {
            let overlay = GenerateOptions {
                tool_choice: Some(ToolChoice::Specific {
                    name: GENERATE_RESPONSE_TOOL.to_string(),
                }),
                ..Default::default()
            };
            base.merge_overlay(&overlay)
        } else {
            base.clone()
        }
    }

    /// Find a `generate_response` call in `msg`, if any.
    fn find_call(msg: &Msg) -> Option<(ToolCallId, &Value)> {
        msg.content.iter().find_map(|block| match block {
            ContentBlock::ToolUse { id, name, input, .. } if name == GENERATE_RESPONSE_TOOL => {
                Some((id.clone(), input))
            }
            _ => None,
        })
    }

    /// Inspect `msg` for the structured payload, advancing retry state.
    pub fn inspect(&mut self, msg: &Msg) -> StructuredOutputOutcome {
        let Some((_, input)) = Self::find_call(msg) else {
            return self.retry_or_exhaust("model did not call generate_response this round");
        };

        let Some(payload) = input.get("response") else {
            return self.retry_or_exhaust("generate_response call is missing the \"response\" argument");
        };

        match schema::validate(payload, &self.target_schema) {
            Ok(()) => {
                self.attempts = 0;
                self.needs_retry = false;
                StructuredOutputOutcome::Satisfied(payload.clone())
            }
            Err(reason) => self.retry_or_exhaust(&reason),
        }
    }

    fn retry_or_exhaust(&mut self, reason: &str) -> StructuredOutputOutcome {
        self.attempts += 1;
        if self.attempts > self.max_retries {
            return StructuredOutputOutcome::Exhausted(SchemaError::RetriesExhausted {
                attempts: self.attempts,
                last: reason.to_string(),
            });
        }
        self.needs_retry = true;
        StructuredOutputOutcome::Retry {
            reminder: self.reminder_message(reason),
        }
    }

    fn reminder_message(&self, reason: &str) -> Msg {
        let text = format!(
            "Your previous response did not produce a valid structured result: {reason}. \
             Call `generate_response` with a single `response` argument matching the required schema."
        );
        Msg::hint(
            reagent_core::MsgId::from_counter(0),
            "structured_output_coordinator",
            &text,
            [
                (STRUCTURED_OUTPUT_REMINDER.to_string(), json!(true)),
                (
                    STRUCTURED_OUTPUT_REMINDER_TYPE.to_string(),
                    json!(self.mode.as_str()),
                ),
                (BYPASS_MULTIAGENT_HISTORY_MERGE.to_string(), json!(true)),
            ]
            .into_iter()
            .collect(),
        )
    }

    /// Whether a prior round is still owed a valid call.
    pub fn needs_retry(&self) -> bool {
        self.needs_retry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reagent_core::Role;

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["location"],
            "properties": { "location": {"type": "string"} }
        })
    }

    fn msg_with_blocks(content: Vec<ContentBlock>) -> Msg {
        Msg::new(reagent_core::MsgId::from_counter(1), "assistant", Role::Assistant, content)
    }

    #[test]
    fn satisfied_call_resets_state() {
        let mut coord = StructuredOutputCoordinator::new(StructuredOutputMode::ToolChoice, schema(), 2);
        let msg = msg_with_blocks(vec![ContentBlock::ToolUse {
            id: reagent_core::ToolCallId::new("t1"),
            name: GENERATE_RESPONSE_TOOL.to_string(),
            input: json!({"response": {"location": "SF"}}),
            raw_content: None,
        }]);
        match coord.inspect(&msg) {
            StructuredOutputOutcome::Satisfied(v) => assert_eq!(v["location"], "SF"),
            other => panic!("expected Satisfied, got {other:?}"),
        }
        assert!(!coord.needs_retry());
    }

    #[test]
    fn missing_call_triggers_retry_then_exhausts() {
        let mut coord = StructuredOutputCoordinator::new(StructuredOutputMode::ToolChoice, schema(), 1);
        let empty = msg_with_blocks(vec![ContentBlock::text("no tool call here")]);

        match coord.inspect(&empty) {
            StructuredOutputOutcome::Retry { .. } => {}
            other => panic!("expected Retry, got {other:?}"),
        }
        assert!(coord.needs_retry());

        match coord.inspect(&empty) {
            StructuredOutputOutcome::Exhausted(SchemaError::RetriesExhausted { attempts, .. }) => {
                assert_eq!(attempts, 2);
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[test]
    fn invalid_payload_is_retried_not_satisfied() {
        let mut coord = StructuredOutputCoordinator::new(StructuredOutputMode::Prompt, schema(), 2);
        let msg = msg_with_blocks(vec![ContentBlock::ToolUse {
            id: reagent_core::ToolCallId::new("t1"),
            name: GENERATE_RESPONSE_TOOL.to_string(),
            input: json!({"response": {}}),
            raw_content: None,
        }]);
        match coord.inspect(&msg) {
            StructuredOutputOutcome::Retry { reminder } => {
                assert_eq!(
                    reminder.metadata.get(STRUCTURED_OUTPUT_REMINDER_TYPE).unwrap(),
                    "PROMPT"
                );
            }
            other => panic!("expected Retry, got {other:?}"),
        }
    }

    #[test]
    fn prompt_mode_never_forces_tool_choice() {
        let mut coord = StructuredOutputCoordinator::new(StructuredOutputMode::Prompt, schema(), 2);
        coord.needs_retry = true;
        let base = GenerateOptions::default();
        let overlaid = coord.before_round(&base);
        assert!(overlaid.tool_choice.is_none());
    }

    #[test]
    fn tool_choice_mode_forces_specific_tool_after_retry() {
        let mut coord = StructuredOutputCoordinator::new(StructuredOutputMode::ToolChoice, schema(), 2);
        coord.needs_retry = true;
        let base = GenerateOptions::default();
        let overlaid = coord.before_round(&base);
        match overlaid.tool_choice {
            Some(ToolChoice::Specific { name }) => assert_eq!(name, GENERATE_RESPONSE_TOOL),
            other => panic!("expected Specific tool_choice, got {other:?}"),
        }
    }
}
