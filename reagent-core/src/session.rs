//! Session persistence protocol.
//!
//! A `Session` is a typed key/field store external to the engine: agents
//! save and restore themselves into it, but do not own it. Two
//! implementations are provided as separate crates: `reagent-state-memory`
//! and `reagent-state-fs`.

use crate::error::StateError;
use crate::id::SessionKey;
use async_trait::async_trait;

/// Typed key/field session store.
///
/// Implementations must tolerate concurrent reads, writes, and
/// `append_list` calls against the same `(session, field)` pair without
/// data loss — callers may hold one `Session` across many agents.
#[async_trait]
pub trait Session: Send + Sync {
    /// Read a single value, if present.
    async fn get(
        &self,
        session: &SessionKey,
        field: &str,
    ) -> Result<Option<serde_json::Value>, StateError>;

    /// Write a single value, overwriting any previous value.
    async fn put(
        &self,
        session: &SessionKey,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), StateError>;

    /// Read a list-valued field. Returns an empty list if absent.
    async fn get_list(
        &self,
        session: &SessionKey,
        field: &str,
    ) -> Result<Vec<serde_json::Value>, StateError>;

    /// Append one element to a list-valued field, creating it if absent.
    async fn append_list(
        &self,
        session: &SessionKey,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), StateError>;

    /// True if `field` has ever been written under `session`.
    async fn exists(&self, session: &SessionKey, field: &str) -> Result<bool, StateError>;
}

/// Reserved field name used by [`crate::error::StateError`]-returning
/// `loadIfExists` checks: a session key is considered to "exist" iff this
/// field has been written.
pub const AGENT_META_FIELD: &str = "agent_meta";

/// Reserved field names for the persisted state layout (§6).
pub const MEMORY_MESSAGES_FIELD: &str = "memory_messages";

/// See [`MEMORY_MESSAGES_FIELD`].
pub const TOOLKIT_ACTIVE_GROUPS_FIELD: &str = "toolkit_activeGroups";

/// See [`MEMORY_MESSAGES_FIELD`].
pub const PLAN_NOTEBOOK_FIELD: &str = "plan_notebook";
