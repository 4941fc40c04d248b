//! File-based session cache
//!
//! Persists the cache entry as a single JSON document under the cache
//! directory. Writes go through a temp file and rename so a crash cannot
//! leave a half-written entry.

use super::SessionCache;
use crate::core_session::errors::CacheError;
use crate::core_session::types::SessionCacheEntry;
use std::fs;
use std::path::PathBuf;

/// Fixed file name for the session cache entry
const CACHE_FILE: &str = "session.json";

/// File-based session cache
pub struct FileSessionCache {
    /// Directory where the cache file is stored
    base_path: PathBuf,
}

impl FileSessionCache {
    /// Create a file cache rooted at the given directory
    pub fn new(base_path: PathBuf) -> Result<Self, CacheError> {
        fs::create_dir_all(&base_path)?;
        Ok(FileSessionCache { base_path })
    }

    fn entry_path(&self) -> PathBuf {
        self.base_path.join(CACHE_FILE)
    }

    /// Write file atomically (write to temp, then rename)
    fn write_atomic(&self, path: &PathBuf, data: &[u8]) -> Result<(), CacheError> {
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, data)?;
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl SessionCache for FileSessionCache {
    fn put(&self, entry: &SessionCacheEntry) -> Result<(), CacheError> {
        let serialized = serde_json::to_vec_pretty(entry)?;
        let path = self.entry_path();
        self.write_atomic(&path, &serialized)
    }

    fn get(&self) -> Result<Option<SessionCacheEntry>, CacheError> {
        let path = self.entry_path();
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        let entry = serde_json::from_slice(&data)?;
        Ok(Some(entry))
    }

    fn remove(&self) -> Result<(), CacheError> {
        let path = self.entry_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_session::types::UserId;
    use tempfile::TempDir;

    fn sample_entry() -> SessionCacheEntry {
        SessionCacheEntry {
            user_id: UserId::new("u-1".to_string()),
            email: "a@b.com".to_string(),
            display_name: "Alice".to_string(),
            photo_url: "data:image/png;base64,aGVsbG8=".to_string(),
        }
    }

    #[test]
    fn test_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileSessionCache::new(temp_dir.path().to_path_buf()).unwrap();

        cache.put(&sample_entry()).unwrap();

        let loaded = cache.get().unwrap();
        assert_eq!(loaded, Some(sample_entry()));
    }

    #[test]
    fn test_get_without_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileSessionCache::new(temp_dir.path().to_path_buf()).unwrap();

        assert!(cache.get().unwrap().is_none());
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileSessionCache::new(temp_dir.path().to_path_buf()).unwrap();

        cache.put(&sample_entry()).unwrap();
        cache.remove().unwrap();

        assert!(cache.get().unwrap().is_none());
        assert!(!cache.entry_path().exists());
    }

    #[test]
    fn test_remove_absent_entry_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileSessionCache::new(temp_dir.path().to_path_buf()).unwrap();

        assert!(cache.remove().is_ok());
    }

    #[test]
    fn test_put_replaces_previous_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileSessionCache::new(temp_dir.path().to_path_buf()).unwrap();

        cache.put(&sample_entry()).unwrap();

        let mut updated = sample_entry();
        updated.display_name = "Alice B".to_string();
        cache.put(&updated).unwrap();

        assert_eq!(cache.get().unwrap(), Some(updated));
    }

    #[test]
    fn test_corrupted_file_reports_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileSessionCache::new(temp_dir.path().to_path_buf()).unwrap();

        fs::write(cache.entry_path(), b"not json").unwrap();

        match cache.get() {
            Err(CacheError::Serialization(_)) => {}
            other => panic!("Expected Serialization error, got {:?}", other),
        }
    }
}
