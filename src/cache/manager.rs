//! Disk store for persisted snapshot records
//!
//! Provides a `CacheManager` that stores serializable records as JSON files
//! keyed by name, each stamped with the time it was written.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Wrapper struct for a record stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The stored data
    data: T,
    /// When the record was written
    stored_at: DateTime<Utc>,
}

/// Result of reading a record, including when it was written
#[derive(Debug)]
pub struct StoredRecord<T> {
    /// The stored data
    pub data: T,
    /// When the record was written
    pub stored_at: DateTime<Utc>,
}

/// Manages reading and writing named records to disk
///
/// Records are JSON files in an XDG-compliant cache directory
/// (`~/.cache/tradepulse/` on Linux). Freshness is decided by the caller.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where record files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "tradepulse")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the directory records are stored in
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a record file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes a record, replacing any previous record under the same key
    ///
    /// The file is written to a temporary path and renamed into place so a
    /// reader never sees a partially written record.
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> std::io::Result<()> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            data,
            stored_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let path = self.cache_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)
    }

    /// Reads a record
    ///
    /// Returns `None` if the record doesn't exist or cannot be parsed.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<StoredRecord<T>> {
        let path = self.cache_path(key);
        let content = fs::read_to_string(path).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        Some(StoredRecord {
            data: entry.data,
            stored_at: entry.stored_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[test]
    fn test_write_creates_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();
        let data = TestData {
            name: "trades".to_string(),
            value: 42,
        };

        cache.write("trades", &data).expect("Write should succeed");

        let expected_path = temp_dir.path().join("trades.json");
        assert!(expected_path.exists(), "Record file should exist");
        assert!(!temp_dir.path().join("trades.json.tmp").exists());

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"stored_at\""));
        assert!(content.contains("42"));
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result: Option<StoredRecord<TestData>> = cache.read("nonexistent_key");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_read_returns_none_for_corrupt_record() {
        let (cache, temp_dir) = create_test_cache();
        fs::write(temp_dir.path().join("issuers.json"), "{not json").unwrap();

        let result: Option<StoredRecord<TestData>> = cache.read("issuers");

        assert!(result.is_none());
    }

    #[test]
    fn test_read_returns_none_for_mismatched_type() {
        let (cache, _temp_dir) = create_test_cache();
        cache.write("politicians", &vec![1, 2, 3]).unwrap();

        let result: Option<StoredRecord<TestData>> = cache.read("politicians");

        assert!(result.is_none());
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheManager::with_dir(nested_path.clone());

        cache.write("nested_key", &1u32).expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key.json").exists());
        assert_eq!(cache.dir(), nested_path.as_path());
    }

    #[test]
    fn test_stored_at_timestamp_is_recorded() {
        let (cache, _temp_dir) = create_test_cache();
        let data = TestData {
            name: "timestamp".to_string(),
            value: 999,
        };

        let before = Utc::now();
        cache.write("timestamp_key", &data).expect("Write should succeed");
        let after = Utc::now();

        let result: StoredRecord<TestData> = cache.read("timestamp_key").expect("Should read record");

        assert_eq!(result.data, data);
        assert!(result.stored_at >= before, "stored_at should be after write started");
        assert!(result.stored_at <= after, "stored_at should be before write finished");
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            let path_str = cache.cache_dir.to_string_lossy();
            assert!(
                path_str.contains("tradepulse"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_overwrite_existing_record() {
        let (cache, _temp_dir) = create_test_cache();
        let first = TestData {
            name: "first".to_string(),
            value: 1,
        };
        let second = TestData {
            name: "second".to_string(),
            value: 2,
        };

        cache.write("overwrite_key", &first).expect("First write should succeed");
        cache.write("overwrite_key", &second).expect("Second write should succeed");

        let result: StoredRecord<TestData> = cache.read("overwrite_key").expect("Should read record");

        assert_eq!(result.data, second, "Store should contain latest data");
    }
}
