#![deny(missing_docs)]
//! Toolkit: tool registry, schema exposure, active-group filtering, and
//! timeout-guarded invocation.
//!
//! Invocation never propagates a handler failure as a hard error to the
//! engine — failures and timeouts are returned as a distinguishable
//! `ToolError` the engine converts into an `Error: …` text block, matching
//! the ReAct loop's "tool errors don't abort the loop" contract.

pub mod registry;

pub use reagent_core::ToolError;
pub use registry::{ToolCtx, ToolDescriptor, ToolHandler, ToolRegistry, ToolSchema};
