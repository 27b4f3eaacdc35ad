//! Ordered message store.
//!
//! No implicit eviction: callers (the summarization pass, state restore)
//! are responsible for any pruning via `replace_range`.

use crate::content::Msg;

/// An ordered, append-mostly sequence of [`Msg`].
#[derive(Debug, Clone, Default)]
pub struct Memory {
    messages: Vec<Msg>,
}

impl Memory {
    /// An empty memory.
    pub fn new() -> Self {
        Self { messages: Vec::new() }
    }

    /// Restore a memory from a previously saved message list (used by
    /// session load).
    pub fn from_messages(messages: Vec<Msg>) -> Self {
        Self { messages }
    }

    /// Append a single message.
    pub fn append(&mut self, msg: Msg) {
        self.messages.push(msg);
    }

    /// Append a batch of messages, preserving order.
    pub fn extend(&mut self, msgs: impl IntoIterator<Item = Msg>) {
        self.messages.extend(msgs);
    }

    /// Immutable copy of the full message list, in order.
    pub fn snapshot(&self) -> Vec<Msg> {
        self.messages.clone()
    }

    /// Number of messages currently held.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if no messages have been appended.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replace the `[start, end)` range with `replacement`, e.g. collapsing
    /// an overflowed transcript into a single summary message.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: Vec<Msg>) {
        let end = end.min(self.messages.len());
        let start = start.min(end);
        self.messages.splice(start..end, replacement);
    }

    /// The last message matching `pred`, if any.
    pub fn last_matching(&self, pred: impl Fn(&Msg) -> bool) -> Option<&Msg> {
        self.messages.iter().rev().find(|m| pred(m))
    }

    /// Iterate messages in order.
    pub fn iter(&self) -> impl Iterator<Item = &Msg> {
        self.messages.iter()
    }
}
