//! The Model interface: the one collaborator the ReAct engine requires.
//!
//! `Model` is object-safe (the engine holds `Arc<dyn Model>`) and streams
//! an unbounded sequence of [`ChatResponse`] elements; the engine
//! accumulates deltas itself. `Formatter` renders the transcript into a
//! provider-specific payload and parses a payload back into a
//! `ChatResponse` — both sides of the wire the engine never looks at
//! directly.

use crate::types::{ChatResponse, ToolSchema};
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use reagent_core::{GenerateOptions, ModelError, Msg};

/// A lazy, unbounded sequence of [`ChatResponse`] elements.
pub type ChatStream = BoxStream<'static, Result<ChatResponse, ModelError>>;

/// Streaming chat contract consumed by the ReAct loop.
#[async_trait]
pub trait Model: Send + Sync {
    /// Stream a completion for `messages` given the exposed `tools` and
    /// per-round `options`.
    async fn stream(
        &self,
        messages: Vec<Msg>,
        tools: Vec<ToolSchema>,
        options: GenerateOptions,
    ) -> Result<ChatStream, ModelError>;
}

/// Transcript → provider payload, and provider payload → [`ChatResponse`].
///
/// No concrete implementation lives in this crate; vendor HTTP/SDK clients
/// implement `Formatter` alongside a matching `Model`.
pub trait Formatter: Send + Sync {
    /// Render `messages` into an opaque provider payload.
    fn format(&self, messages: &[Msg]) -> serde_json::Value;

    /// Parse a provider payload, recorded at `start_time`, into a
    /// [`ChatResponse`]. `start_time` lets the formatter compute latency
    /// for the `ChatUsage` it attaches.
    fn parse_response(
        &self,
        payload: serde_json::Value,
        start_time: std::time::Instant,
    ) -> Result<ChatResponse, ModelError>;
}
