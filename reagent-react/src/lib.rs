#![deny(missing_docs)]
//! The ReAct (reason-act) execution loop.
//!
//! [`ReactEngine`] drives one agent's REASON/ACT cycle over a shared
//! [`reagent_core::Memory`] and [`reagent_tool::ToolRegistry`], dispatching
//! hooks at each phase boundary and coordinating with
//! [`reagent_structured::StructuredOutputCoordinator`] when the caller
//! requires a structured terminal payload.

pub mod config;
pub mod engine;
pub mod events;

pub use config::EngineConfig;
pub use engine::ReactEngine;
pub use events::{EventKind, StreamItem, StreamOptions};
