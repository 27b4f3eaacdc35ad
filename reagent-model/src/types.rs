//! Types exchanged across the Model and Formatter interfaces.
//!
//! Unlike a provider adapter, this crate does not define a second,
//! provider-specific message representation: the Formatter interface
//! converts directly between `reagent_core::Msg`/`ContentBlock` and an
//! opaque provider payload (`serde_json::Value`), since no concrete
//! formatter lives in this crate — only the interface does.

use reagent_core::{ChatUsage, ContentBlock};
use serde::{Deserialize, Serialize};

/// JSON Schema description of a tool, as handed to the Model each round.
pub type ToolSchema = serde_json::Value;

/// One element of the Model's streamed response sequence.
///
/// Successive elements may extend text/thinking incrementally, or finalize
/// a tool-use block; the engine accumulates deltas into a single terminal
/// content list. `is_final` marks the last element, at which point `usage`
/// is expected to be populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Identifier stable across every element of one round's sequence.
    pub id: String,
    /// The content produced (incrementally or finally) by this element.
    pub content: Vec<ContentBlock>,
    /// Usage accounting. Typically only set on the final element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatUsage>,
    /// Set on the last element of the sequence.
    #[serde(default)]
    pub is_final: bool,
}

impl ChatResponse {
    /// A single, non-streamed final response — convenient for Model
    /// implementations (and tests) that don't actually stream.
    pub fn complete(id: impl Into<String>, content: Vec<ContentBlock>, usage: Option<ChatUsage>) -> Self {
        Self {
            id: id.into(),
            content,
            usage,
            is_final: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_response_is_final() {
        let r = ChatResponse::complete("r1", vec![ContentBlock::text("hi")], None);
        assert!(r.is_final);
    }
}
