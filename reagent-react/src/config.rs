//! Static configuration for a [`crate::ReactEngine`].

use std::time::Duration;

/// Configuration governing iteration limits and per-tool timeouts.
///
/// Resolved once at engine construction; per-call overrides (a one-shot
/// input message, a target schema) are passed to `call`/`call_stream`
/// directly rather than threaded through here.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum REASON/ACT round-trips before falling back to SUMMARIZE.
    pub max_iters: u32,
    /// Per-tool-invocation timeout.
    pub tool_timeout: Duration,
    /// Bounded channel capacity for `call_stream`'s event sink.
    pub stream_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iters: 10,
            tool_timeout: Duration::from_secs(30),
            stream_capacity: 64,
        }
    }
}
