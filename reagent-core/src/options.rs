//! Model generation options, shared by the Model interface, the hook bus,
//! and the structured-output coordinator (which overlays `tool_choice`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the model should select among the tools it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides freely whether to call a tool.
    Auto,
    /// The model must not call any tool this round.
    None,
    /// The model must call exactly this tool this round.
    Specific {
        /// The tool name the model is forced to call.
        name: String,
    },
}

impl Default for ToolChoice {
    fn default() -> Self {
        ToolChoice::Auto
    }
}

/// Per-round model generation parameters. Unset (`None`) fields inherit
/// whatever default the Model implementor applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Maximum tokens to generate this round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Frequency penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Presence penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// Budget (in tokens) the model may spend on internal `Thinking` content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<u32>,
    /// Tool selection strategy for this round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Provider-specific extra body parameters, passed through opaquely.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub additional_body_params: HashMap<String, serde_json::Value>,
}

impl GenerateOptions {
    /// Overlay `other` onto `self`: any field set in `other` replaces the
    /// corresponding field in `self`; unset fields are left untouched.
    ///
    /// Used by the structured-output coordinator to force `tool_choice`
    /// without disturbing caller-supplied temperature/top_p/etc.
    pub fn merge_overlay(&self, other: &GenerateOptions) -> GenerateOptions {
        GenerateOptions {
            temperature: other.temperature.or(self.temperature),
            top_p: other.top_p.or(self.top_p),
            max_tokens: other.max_tokens.or(self.max_tokens),
            frequency_penalty: other.frequency_penalty.or(self.frequency_penalty),
            presence_penalty: other.presence_penalty.or(self.presence_penalty),
            thinking_budget: other.thinking_budget.or(self.thinking_budget),
            tool_choice: other.tool_choice.clone().or_else(|| self.tool_choice.clone()),
            additional_body_params: if other.additional_body_params.is_empty() {
                self.additional_body_params.clone()
            } else {
                other.additional_body_params.clone()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overlay_only_replaces_set_fields() {
        let base = GenerateOptions {
            temperature: Some(0.7),
            max_tokens: Some(1024),
            ..Default::default()
        };
        let overlay = GenerateOptions {
            tool_choice: Some(ToolChoice::Specific { name: "generate_response".into() }),
            ..Default::default()
        };
        let merged = base.merge_overlay(&overlay);
        assert_eq!(merged.temperature, Some(0.7));
        assert_eq!(merged.max_tokens, Some(1024));
        assert_eq!(merged.tool_choice, Some(ToolChoice::Specific { name: "generate_response".into() }));
    }
}
