//! Message model: roles, tagged content blocks, and usage accounting.

use crate::id::{MsgId, ToolCallId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A message's role. Immutable once a [`Msg`] is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// System prompt / instructions.
    System,
    /// User-authored input, including injected hints and reminders.
    User,
    /// Model-authored reasoning or tool-use turn.
    Assistant,
    /// Tool results for one preceding assistant turn. Contains exactly the
    /// `ToolResult` blocks answering that turn's `ToolUse` blocks.
    Tool,
}

/// Source of an `Image`/`Audio`/`Video` content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaSource {
    /// A remote URL the model/provider is expected to fetch.
    Url {
        /// The resource URL.
        url: String,
    },
    /// Inline base64-encoded bytes.
    Base64 {
        /// IANA media type, e.g. `"image/png"`.
        media_type: String,
        /// Base64-encoded payload.
        data: String,
    },
}

/// A single block of message content. Closed sum type: an unrecognized
/// `type` tag fails deserialization rather than being silently dropped.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text payload.
        text: String,
    },
    /// Internal model reasoning. Never sent back to the model in a
    /// subsequent request payload — formatters must drop it on the way out.
    Thinking {
        /// The reasoning payload.
        thinking: String,
    },
    /// A model-issued tool invocation request.
    ToolUse {
        /// Correlates with the matching `ToolResult.id`.
        id: ToolCallId,
        /// Registered tool name.
        name: String,
        /// Tool input, matching the tool's parameter schema.
        input: serde_json::Value,
        /// Provider-specific raw content backing this block, if the
        /// formatter needs to echo it back verbatim.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw_content: Option<serde_json::Value>,
    },
    /// The result of executing a `ToolUse` block.
    ToolResult {
        /// Matches the originating `ToolUse.id`.
        id: ToolCallId,
        /// Tool name, echoed for convenience.
        name: String,
        /// Output content blocks (usually a single `Text`).
        output: Vec<ContentBlock>,
        /// Set when the handler failed or timed out.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    /// An image.
    Image {
        /// Where to find the image bytes.
        source: MediaSource,
    },
    /// An audio clip.
    Audio {
        /// Where to find the audio bytes.
        source: MediaSource,
    },
    /// A video clip.
    Video {
        /// Where to find the video bytes.
        source: MediaSource,
    },
}

impl ContentBlock {
    /// Shorthand for a `Text` block.
    pub fn text(s: impl Into<String>) -> Self {
        ContentBlock::Text { text: s.into() }
    }

    /// Shorthand for an error `ToolResult`: single `Text` block prefixed
    /// `"Error: "`, matching the toolkit's error-capture contract.
    pub fn tool_error(id: ToolCallId, name: impl Into<String>, message: impl AsRef<str>) -> Self {
        ContentBlock::ToolResult {
            id,
            name: name.into(),
            output: vec![ContentBlock::text(format!("Error: {}", message.as_ref()))],
            is_error: true,
        }
    }

    /// Borrow the text payload if this block is a `Text` block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Token/latency accounting attached to a single `Msg`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatUsage {
    /// Prompt tokens consumed producing this message.
    pub input_tokens: u32,
    /// Completion tokens produced.
    pub output_tokens: u32,
    /// Wall-clock time the model took to produce this message.
    #[serde(default)]
    pub latency: crate::duration::DurationMs,
}

/// A single message in a [`crate::Memory`].
///
/// Invariants: `role` is immutable once constructed; `id` is unique within
/// the owning memory; a `Tool`-role message contains exactly the
/// `ToolResult` blocks answering one preceding assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Msg {
    /// Stable identifier, unique within a memory.
    pub id: MsgId,
    /// Agent or user identifier that authored this message.
    pub name: String,
    /// Immutable role.
    pub role: Role,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
    /// Free-form metadata, e.g. structured-output reminder markers.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Usage accounting, present for model-produced messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_usage: Option<ChatUsage>,
}

impl Msg {
    /// Construct a message with no metadata and no usage accounting.
    pub fn new(id: MsgId, name: impl Into<String>, role: Role, content: Vec<ContentBlock>) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            content,
            metadata: HashMap::new(),
            chat_usage: None,
        }
    }

    /// Construct a single-text-block user message.
    pub fn user_text(id: MsgId, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, name, Role::User, vec![ContentBlock::text(text)])
    }

    /// Construct a single-text-block system-hint user message, tagged with
    /// the given metadata entries (used by reminders and plan hints).
    pub fn hint(
        id: MsgId,
        name: impl Into<String>,
        text: impl Into<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        let mut msg = Self::new(id, name, Role::User, vec![ContentBlock::text(text)]);
        msg.metadata = metadata;
        msg
    }

    /// All `ToolUse` blocks in this message, in appearance order.
    pub fn tool_uses(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content
            .iter()
            .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// True if this message contains at least one `ToolUse` block.
    pub fn has_tool_use(&self) -> bool {
        self.tool_uses().next().is_some()
    }

    /// Concatenated text of all `Text` blocks, joined by `\n`.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_block_roundtrips() {
        let b = ContentBlock::text("hi");
        let json = serde_json::to_string(&b).unwrap();
        let back: ContentBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }

    #[test]
    fn unknown_tag_fails_closed() {
        let bad = r#"{"type":"made_up","foo":"bar"}"#;
        let result: Result<ContentBlock, _> = serde_json::from_str(bad);
        assert!(result.is_err());
    }

    #[test]
    fn msg_text_joins_text_blocks_only() {
        let id = ToolCallId::new("call_1");
        let msg = Msg::new(
            MsgId::new("m1"),
            "assistant",
            Role::Assistant,
            vec![
                ContentBlock::text("part one"),
                ContentBlock::ToolUse {
                    id,
                    name: "lookup".into(),
                    input: serde_json::json!({}),
                    raw_content: None,
                },
                ContentBlock::text("part two"),
            ],
        );
        assert_eq!(msg.text(), "part one\npart two");
        assert!(msg.has_tool_use());
    }

    #[test]
    fn tool_error_block_is_prefixed() {
        let b = ContentBlock::tool_error(ToolCallId::new("c1"), "slow_tool", "boom");
        match b {
            ContentBlock::ToolResult { output, is_error, .. } => {
                assert!(is_error);
                assert_eq!(output[0].as_text(), Some("Error: boom"));
            }
            _ => panic!("expected ToolResult"),
        }
    }
}
