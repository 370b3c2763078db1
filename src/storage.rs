use crate::error::StorageError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Session-scoped key-value storage (the browser's `sessionStorage`).
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Writes can fail, e.g. when storage is disabled or over quota.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process `SessionStore` living as long as the value itself.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
    read_only: AtomicBool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.lock().insert(key.to_string(), value.to_string());
        self
    }

    /// Make every subsequent `set` fail, as a browser does with storage disabled.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "cannot write '{}': storage is read-only",
                key
            )));
        }
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
