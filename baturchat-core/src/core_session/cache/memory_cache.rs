//! In-memory session cache
//!
//! Holds the entry in process memory only. Used in tests and anywhere
//! persistence across restarts is not wanted.

use super::SessionCache;
use crate::core_session::errors::CacheError;
use crate::core_session::types::SessionCacheEntry;
use std::sync::Mutex;

/// In-memory session cache
#[derive(Default)]
pub struct MemorySessionCache {
    entry: Mutex<Option<SessionCacheEntry>>,
}

impl MemorySessionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionCache for MemorySessionCache {
    fn put(&self, entry: &SessionCacheEntry) -> Result<(), CacheError> {
        *self.entry.lock().unwrap() = Some(entry.clone());
        Ok(())
    }

    fn get(&self) -> Result<Option<SessionCacheEntry>, CacheError> {
        Ok(self.entry.lock().unwrap().clone())
    }

    fn remove(&self) -> Result<(), CacheError> {
        *self.entry.lock().unwrap() = None;
        Ok(())
    }
}
