//! Session persistence: what an agent saves/restores, and the protocol
//! for doing so.
//!
//! Built on [`reagent_core::Session`]'s reserved field names
//! (`AGENT_META_FIELD`, `MEMORY_MESSAGES_FIELD`,
//! `TOOLKIT_ACTIVE_GROUPS_FIELD`, `PLAN_NOTEBOOK_FIELD`); an agent never
//! owns the `Session` it's handed, it just reads/writes those fields under
//! a caller-supplied key.

use async_trait::async_trait;
use reagent_core::{Session, SessionKey, StateError};

/// Which parts of an agent's runtime state `StateModule::save_to` persists
/// and `load_from` restores.
///
/// `agent_meta` (id/name/description/system prompt) is always written —
/// `loadIfExists` semantics key off its presence alone, so even the
/// [`StatePersistence::none`] preset writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatePersistence {
    /// Always persisted in practice, but kept as a field rather than a
    /// dropped implicit constant so presets can document intent uniformly.
    pub agent_managed: bool,
    /// Persist/restore the full message transcript.
    pub memory_managed: bool,
    /// Persist/restore the toolkit's active-group filter.
    pub toolkit_managed: bool,
    /// Persist/restore the plan notebook, if one is configured.
    pub plan_notebook_managed: bool,
}

impl StatePersistence {
    /// Only `agent_meta` is persisted; memory, toolkit filter, and plan
    /// notebook are not.
    pub fn none() -> Self {
        Self {
            agent_managed: true,
            memory_managed: false,
            toolkit_managed: false,
            plan_notebook_managed: false,
        }
    }

    /// Everything is persisted.
    pub fn all() -> Self {
        Self {
            agent_managed: true,
            memory_managed: true,
            toolkit_managed: true,
            plan_notebook_managed: true,
        }
    }

    /// `agent_meta` plus the message transcript; toolkit filter and plan
    /// notebook are left alone.
    pub fn memory_only() -> Self {
        Self {
            agent_managed: true,
            memory_managed: true,
            toolkit_managed: false,
            plan_notebook_managed: false,
        }
    }
}

impl Default for StatePersistence {
    fn default() -> Self {
        Self::all()
    }
}

/// Something that can save itself into, and restore itself from, a
/// [`Session`] at a given key.
#[async_trait]
pub trait StateModule: Send + Sync {
    /// Persist whatever `StatePersistence` selects under `key`.
    async fn save_to(&self, session: &dyn Session, key: &SessionKey) -> Result<(), StateError>;

    /// Restore from `key`. Returns `false` iff `AGENT_META_FIELD` is absent
    /// at `key` — a fresh key, not a corrupt one — in which case nothing
    /// else is read and the caller's existing in-memory state is left
    /// untouched.
    async fn load_from(&self, session: &dyn Session, key: &SessionKey) -> Result<bool, StateError>;
}
