//! Streamed event types emitted by [`crate::ReactEngine::call_stream`].

use reagent_core::{ContentBlock, Msg};
use std::collections::HashSet;

/// Which categories of streamed item a caller wants delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Incremental/accumulated reasoning deltas.
    Reasoning,
    /// A tool's result, as it's appended to memory.
    ToolResult,
    /// A hint message injected by a hook (e.g. the plan view) or by the
    /// structured-output coordinator's reminder.
    Hint,
    /// The summary message produced on iteration-budget overflow.
    Summary,
    /// The final terminal message.
    AgentResult,
    /// Everything above.
    All,
}

/// Controls what `call_stream` delivers and how.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Event kinds to deliver. `{All}` (the default) delivers everything.
    pub events: HashSet<EventKind>,
    /// Bounded channel capacity.
    pub capacity: usize,
    /// When true, each `Reasoning` item carries the full accumulated
    /// message so far; when false (the default), each carries only the
    /// incremental delta.
    pub cumulative: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            events: [EventKind::All].into_iter().collect(),
            capacity: 64,
            cumulative: false,
        }
    }
}

impl StreamOptions {
    fn wants(&self, kind: EventKind) -> bool {
        self.events.contains(&EventKind::All) || self.events.contains(&kind)
    }
}

/// One item delivered over a `call_stream` channel.
#[derive(Debug, Clone)]
pub enum StreamItem {
    /// See [`EventKind::Reasoning`].
    Reasoning(ContentBlock),
    /// See [`EventKind::ToolResult`].
    ToolResult(ContentBlock),
    /// See [`EventKind::Hint`].
    Hint(Msg),
    /// See [`EventKind::Summary`].
    Summary(Msg),
    /// See [`EventKind::AgentResult`].
    AgentResult(Msg),
}

/// Internal sink threading stream options through the engine's run loop.
pub(crate) struct EventSink {
    pub(crate) tx: tokio::sync::mpsc::Sender<StreamItem>,
    pub(crate) opts: StreamOptions,
}

impl EventSink {
    pub(crate) async fn emit(&self, kind: EventKind, item: StreamItem) {
        if !self.opts.wants(kind) {
            return;
        }
        // A full buffer means the consumer stopped reading; drop rather
        // than block the run loop indefinitely.
        let _ = self.tx.send(item).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_want_everything() {
        let opts = StreamOptions::default();
        assert!(opts.wants(EventKind::Reasoning));
        assert!(opts.wants(EventKind::Summary));
    }

    #[test]
    fn narrowed_options_only_want_selected_kinds() {
        let opts = StreamOptions {
            events: [EventKind::ToolResult].into_iter().collect(),
            ..StreamOptions::default()
        };
        assert!(opts.wants(EventKind::ToolResult));
        assert!(!opts.wants(EventKind::Reasoning));
    }
}
