#![deny(missing_docs)]
//! Core data model for the `reagent` agent execution engine: messages,
//! memory, typed ids, the error taxonomy, and the session persistence
//! protocol.
//!
//! This crate has no opinion about models, tools, or hooks — those are
//! separate crates (`reagent-model`, `reagent-tool`, `reagent-hooks`) built
//! on top of the types here.

pub mod content;
pub mod duration;
pub mod error;
pub mod id;
pub mod memory;
pub mod options;
pub mod session;

pub use content::{ChatUsage, ContentBlock, MediaSource, Msg, Role};
pub use duration::DurationMs;
pub use error::{
    ConfigError, HookError, InterruptError, ModelError, ReactError, SchemaError, StateError,
    ToolError,
};
pub use id::{MsgId, SessionKey, ToolCallId};
pub use memory::Memory;
pub use options::{GenerateOptions, ToolChoice};
pub use session::{
    Session, AGENT_META_FIELD, MEMORY_MESSAGES_FIELD, PLAN_NOTEBOOK_FIELD,
    TOOLKIT_ACTIVE_GROUPS_FIELD,
};
