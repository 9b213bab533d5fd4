use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// In-memory store backed by a mutex-guarded map.
///
/// Contents live and die with the process, which makes this the natural
/// backend for session-scoped flags (the browser analogue is
/// `sessionStorage`) and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
