//! Session cache module
//!
//! Local persistent storage for the session cache entry, kept under a
//! single fixed key. Best-effort: the coordinator logs and continues when
//! a cache operation fails.

use crate::core_session::errors::CacheError;
use crate::core_session::types::SessionCacheEntry;

pub mod file_cache;
pub mod memory_cache;

pub use file_cache::FileSessionCache;
pub use memory_cache::MemorySessionCache;

/// Abstract session cache trait
pub trait SessionCache: Send + Sync {
    /// Store the cache entry, replacing any previous one
    fn put(&self, entry: &SessionCacheEntry) -> Result<(), CacheError>;

    /// Load the cache entry, if one exists
    fn get(&self) -> Result<Option<SessionCacheEntry>, CacheError>;

    /// Remove the cache entry; removing an absent entry is not an error
    fn remove(&self) -> Result<(), CacheError>;
}
