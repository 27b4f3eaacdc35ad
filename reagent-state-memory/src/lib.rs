#![deny(missing_docs)]
//! In-memory implementation of [`reagent_core::Session`].
//!
//! Backed by a `HashMap` behind a `RwLock`. Suitable for testing,
//! prototyping, and single-process use where persistence across restarts
//! is not required.

use async_trait::async_trait;
use reagent_core::{Session, SessionKey, StateError};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory session store.
pub struct MemoryStore {
    data: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn composite_key(session: &SessionKey, field: &str) -> String {
    format!("{}\0{field}", session.as_str())
}

#[async_trait]
impl Session for MemoryStore {
    async fn get(&self, session: &SessionKey, field: &str) -> Result<Option<serde_json::Value>, StateError> {
        let data = self.data.read().await;
        Ok(data.get(&composite_key(session, field)).cloned())
    }

    async fn put(&self, session: &SessionKey, field: &str, value: serde_json::Value) -> Result<(), StateError> {
        let mut data = self.data.write().await;
        data.insert(composite_key(session, field), value);
        Ok(())
    }

    async fn get_list(&self, session: &SessionKey, field: &str) -> Result<Vec<serde_json::Value>, StateError> {
        let data = self.data.read().await;
        match data.get(&composite_key(session, field)) {
            Some(serde_json::Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(StateError::Serialization(format!(
                "field \"{field}\" is not a list"
            ))),
            None => Ok(vec![]),
        }
    }

    async fn append_list(&self, session: &SessionKey, field: &str, value: serde_json::Value) -> Result<(), StateError> {
        let mut data = self.data.write().await;
        let key = composite_key(session, field);
        match data.get_mut(&key) {
            Some(serde_json::Value::Array(items)) => {
                items.push(value);
            }
            Some(_) => {
                return Err(StateError::Serialization(format!(
                    "field \"{field}\" is not a list"
                )))
            }
            None => {
                data.insert(key, serde_json::Value::Array(vec![value]));
            }
        }
        Ok(())
    }

    async fn exists(&self, session: &SessionKey, field: &str) -> Result<bool, StateError> {
        let data = self.data.read().await;
        Ok(data.contains_key(&composite_key(session, field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn write_and_read_roundtrip() {
        let store = MemoryStore::new();
        let session = SessionKey::new("s1");
        store.put(&session, "agent_meta", json!({"name": "a"})).await.unwrap();
        let val = store.get(&session, "agent_meta").await.unwrap();
        assert_eq!(val, Some(json!({"name": "a"})));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = MemoryStore::new();
        let session = SessionKey::new("s1");
        assert_eq!(store.get(&session, "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn append_list_creates_then_extends() {
        let store = MemoryStore::new();
        let session = SessionKey::new("s1");
        store.append_list(&session, "memory_messages", json!("m1")).await.unwrap();
        store.append_list(&session, "memory_messages", json!("m2")).await.unwrap();
        let list = store.get_list(&session, "memory_messages").await.unwrap();
        assert_eq!(list, vec![json!("m1"), json!("m2")]);
    }

    #[tokio::test]
    async fn get_list_on_absent_field_is_empty() {
        let store = MemoryStore::new();
        let session = SessionKey::new("s1");
        assert!(store.get_list(&session, "missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = MemoryStore::new();
        let a = SessionKey::new("a");
        let b = SessionKey::new("b");
        store.put(&a, "k", json!("a_val")).await.unwrap();
        store.put(&b, "k", json!("b_val")).await.unwrap();
        assert_eq!(store.get(&a, "k").await.unwrap(), Some(json!("a_val")));
        assert_eq!(store.get(&b, "k").await.unwrap(), Some(json!("b_val")));
    }

    #[tokio::test]
    async fn exists_reflects_writes() {
        let store = MemoryStore::new();
        let session = SessionKey::new("s1");
        assert!(!store.exists(&session, "k").await.unwrap());
        store.put(&session, "k", json!(1)).await.unwrap();
        assert!(store.exists(&session, "k").await.unwrap());
    }

    #[test]
    fn memory_store_implements_session() {
        fn _assert_session<T: Session>() {}
        _assert_session::<MemoryStore>();
    }
}
