//! Typed ID wrappers for messages and sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers prevent mixing up message IDs, session keys, etc.
/// These are just strings underneath — no UUID enforcement, no format
/// requirement.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(MsgId, "Unique identifier for a message, stable within a memory.");
typed_id!(SessionKey, "Key identifying a persisted agent session.");
typed_id!(ToolCallId, "Identifier correlating a ToolUse block with its ToolResult.");

impl MsgId {
    /// Generate a new id from a monotonic counter seed.
    ///
    /// Callers that need global uniqueness across processes should supply
    /// their own generator; the engine only requires uniqueness within one
    /// [`crate::Memory`].
    pub fn from_counter(counter: u64) -> Self {
        Self(format!("msg_{counter:016x}"))
    }
}
