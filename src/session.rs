//! Session contract consumed by authentication handlers.
//!
//! The chain does not care how sessions are stored or how they got
//! attached to a request; it only needs key/value access. `MemorySession`
//! covers tests and simple single-process deployments.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Session-like state attached to a request.
pub trait Session: Send + Sync {
    /// Read a value by key.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a value.
    fn insert(&self, key: &str, value: Value);

    /// Remove a value.
    fn forget(&self, key: &str);
}

/// Shared handle to a session.
pub type SharedSession = Arc<dyn Session>;

/// In-memory session backed by a mutex-guarded map.
#[derive(Default)]
pub struct MemorySession {
    values: Mutex<HashMap<String, Value>>,
}

impl MemorySession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session already behind a shared handle.
    pub fn shared() -> SharedSession {
        Arc::new(Self::new())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Session for MemorySession {
    fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    fn insert(&self, key: &str, value: Value) {
        self.lock().insert(key.to_string(), value);
    }

    fn forget(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_session_roundtrip() {
        let session = MemorySession::new();
        assert!(session.get("user_id").is_none());

        session.insert("user_id", json!("42"));
        assert_eq!(session.get("user_id"), Some(json!("42")));

        session.forget("user_id");
        assert!(session.get("user_id").is_none());
    }

    #[test]
    fn test_memory_session_overwrite() {
        let session = MemorySession::new();
        session.insert("k", json!(1));
        session.insert("k", json!(2));
        assert_eq!(session.get("k"), Some(json!(2)));
    }

    #[test]
    fn test_forget_missing_key_is_noop() {
        let session = MemorySession::new();
        session.forget("missing");
        assert!(session.get("missing").is_none());
    }

    #[test]
    fn test_shared_handle() {
        let session = MemorySession::shared();
        session.insert("k", json!("v"));

        let clone = session.clone();
        assert_eq!(clone.get("k"), Some(json!("v")));
    }
}
