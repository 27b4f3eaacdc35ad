#![deny(missing_docs)]
//! # reagent — umbrella crate
//!
//! Single import surface for composing a ReAct-style LLM agent: the
//! [`Agent`] facade ties a [`reagent_react::ReactEngine`] together with an
//! [`AgentConfig`], an optional plan notebook, and the [`StateModule`]
//! session-persistence protocol. Re-exports every member crate plus a
//! `prelude` for the happy path.

pub mod agent;
pub mod config;
pub mod state;

pub use agent::Agent;
pub use config::AgentConfig;
pub use state::{StateModule, StatePersistence};

pub use reagent_core;
pub use reagent_hooks;
pub use reagent_model;
pub use reagent_plan;
pub use reagent_react;
pub use reagent_state_fs;
pub use reagent_state_memory;
pub use reagent_structured;
pub use reagent_tool;

/// Happy-path imports for composing agents.
pub mod prelude {
    pub use crate::{Agent, AgentConfig, StateModule, StatePersistence};

    pub use reagent_core::{
        ChatUsage, ContentBlock, GenerateOptions, Memory, Msg, MsgId, ReactError, Role, Session,
        SessionKey, ToolChoice,
    };

    pub use reagent_hooks::{Hook, HookBus, HookEvent, HookOutcome, HookPoint};

    pub use reagent_model::{ChatResponse, ChatStream, Model};

    pub use reagent_tool::{ToolCtx, ToolDescriptor, ToolHandler, ToolRegistry};

    pub use reagent_structured::{StructuredOutputCoordinator, StructuredOutputMode};

    pub use reagent_plan::{Plan, PlanNotebook, PlanViewHook, SubTask, SubTaskState};

    pub use reagent_react::{EngineConfig, ReactEngine, StreamItem, StreamOptions};

    pub use reagent_state_fs::FsStore;
    pub use reagent_state_memory::MemoryStore;
}
