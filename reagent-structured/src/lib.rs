#![deny(missing_docs)]
//! Structured-output coordination for agents that must terminate a turn
//! with a payload matching a caller-supplied JSON Schema, via a synthetic
//! `generate_response` tool rather than provider-specific JSON mode.

pub mod coordinator;
pub mod schema;

pub use coordinator::{
    StructuredOutputCoordinator, StructuredOutputMode, StructuredOutputOutcome,
    BYPASS_MULTIAGENT_HISTORY_MERGE, GENERATE_RESPONSE_TOOL, STRUCTURED_OUTPUT_REMINDER,
    STRUCTURED_OUTPUT_REMINDER_TYPE,
};
