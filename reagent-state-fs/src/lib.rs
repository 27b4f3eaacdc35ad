#![deny(missing_docs)]
//! Filesystem-backed implementation of [`reagent_core::Session`].
//!
//! Each session key is one JSON document under the root (named by a hash
//! of the key, to keep filenames short and filesystem-safe) holding every
//! field for that session as a top-level object key. Provides persistence
//! across process restarts.

use async_trait::async_trait;
use reagent_core::{Session, SessionKey, StateError};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Filesystem-backed session store.
///
/// Directory layout:
/// ```text
/// root/
///   <session-hash>.json   -- { "field_a": ..., "field_b": ... }
/// ```
///
/// Writes and list-appends within one process are serialized behind an
/// internal mutex so concurrent callers never interleave a read-modify-write.
pub struct FsStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FsStore {
    /// Create a store rooted at `root`. The directory is created lazily
    /// on first write.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }
}

fn session_file_name(session: &SessionKey) -> String {
    let mut hash: u64 = 5381;
    for byte in session.as_str().as_bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(*byte as u64);
    }
    format!("session-{hash:016x}.json")
}

impl FsStore {
    fn session_path(&self, session: &SessionKey) -> PathBuf {
        self.root.join(session_file_name(session))
    }

    async fn read_doc(&self, session: &SessionKey) -> Result<Map<String, Value>, StateError> {
        let path = self.session_path(session);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(_) => Err(StateError::Serialization(format!(
                    "session document at {} is not a JSON object",
                    path.display()
                ))),
                Err(e) => Err(StateError::Serialization(e.to_string())),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(StateError::WriteFailed(e.to_string())),
        }
    }

    async fn write_doc(&self, session: &SessionKey, doc: &Map<String, Value>) -> Result<(), StateError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StateError::WriteFailed(e.to_string()))?;
        let path = self.session_path(session);
        let contents = serde_json::to_string_pretty(doc)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| StateError::WriteFailed(e.to_string()))
    }
}

#[async_trait]
impl Session for FsStore {
    async fn get(&self, session: &SessionKey, field: &str) -> Result<Option<Value>, StateError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.read_doc(session).await?.get(field).cloned())
    }

    async fn put(&self, session: &SessionKey, field: &str, value: Value) -> Result<(), StateError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_doc(session).await?;
        doc.insert(field.to_string(), value);
        self.write_doc(session, &doc).await
    }

    async fn get_list(&self, session: &SessionKey, field: &str) -> Result<Vec<Value>, StateError> {
        let _guard = self.write_lock.lock().await;
        match self.read_doc(session).await?.get(field) {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(StateError::Serialization(format!("field \"{field}\" is not a list"))),
            None => Ok(vec![]),
        }
    }

    async fn append_list(&self, session: &SessionKey, field: &str, value: Value) -> Result<(), StateError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_doc(session).await?;
        let mut items = match doc.get(field) {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(StateError::Serialization(format!("field \"{field}\" is not a list"))),
            None => vec![],
        };
        items.push(value);
        doc.insert(field.to_string(), Value::Array(items));
        self.write_doc(session, &doc).await
    }

    async fn exists(&self, session: &SessionKey, field: &str) -> Result<bool, StateError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.read_doc(session).await?.contains_key(field))
    }
}
