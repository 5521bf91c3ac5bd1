//! Storage for serialized forecast models.
//!
//! One blob per [`ForecastKey`]; a save replaces the previous blob wholesale.

use crate::domain::errors::AnalyticsError;
use crate::domain::forecast::ForecastKey;
use crate::domain::ports::ModelStore;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Stores each model as `{dir}/{asset}_{horizon}d.json`.
pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create models directory {:?}", dir))?;
        }
        info!("FileModelStore: using {:?}", dir);

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &ForecastKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.storage_name()))
    }
}

impl ModelStore for FileModelStore {
    fn contains(&self, key: &ForecastKey) -> Result<bool, AnalyticsError> {
        Ok(self.path_for(key).is_file())
    }

    fn load(&self, key: &ForecastKey) -> Result<Option<Vec<u8>>, AnalyticsError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(blob) => {
                debug!("FileModelStore: read {} bytes from {:?}", blob.len(), path);
                Ok(Some(blob))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AnalyticsError::model_unavailable(
                key,
                format!("failed to read {:?}: {}", path, e),
            )),
        }
    }

    fn save(&self, key: &ForecastKey, blob: &[u8]) -> Result<(), AnalyticsError> {
        let path = self.path_for(key);

        // Write to temp file then rename
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, blob).map_err(|e| {
            AnalyticsError::model_unavailable(
                key,
                format!("failed to write {:?}: {}", temp_path, e),
            )
        })?;
        fs::rename(&temp_path, &path).map_err(|e| {
            AnalyticsError::model_unavailable(key, format!("failed to replace {:?}: {}", path, e))
        })?;

        info!("FileModelStore: saved {} to {:?}", key, path);
        Ok(())
    }

    fn location(&self, key: &ForecastKey) -> String {
        self.path_for(key).display().to_string()
    }
}

/// Process-local store, mostly for tests.
#[derive(Default)]
pub struct InMemoryModelStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(key: &ForecastKey) -> AnalyticsError {
    AnalyticsError::model_unavailable(key, "model store lock poisoned")
}

impl ModelStore for InMemoryModelStore {
    fn contains(&self, key: &ForecastKey) -> Result<bool, AnalyticsError> {
        let blobs = self.blobs.read().map_err(|_| poisoned(key))?;
        Ok(blobs.contains_key(&key.storage_name()))
    }

    fn load(&self, key: &ForecastKey) -> Result<Option<Vec<u8>>, AnalyticsError> {
        let blobs = self.blobs.read().map_err(|_| poisoned(key))?;
        Ok(blobs.get(&key.storage_name()).cloned())
    }

    fn save(&self, key: &ForecastKey, blob: &[u8]) -> Result<(), AnalyticsError> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned(key))?;
        blobs.insert(key.storage_name(), blob.to_vec());
        Ok(())
    }

    fn location(&self, key: &ForecastKey) -> String {
        format!("memory://{}", key.storage_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_temp_dir() -> PathBuf {
        let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "crypto_analytics_test_{}_{}_{}_models",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            unique_id
        ))
    }

    fn key() -> ForecastKey {
        ForecastKey::new("bitcoin", 7).unwrap()
    }

    #[test]
    fn test_new_creates_directory() {
        let dir = unique_temp_dir().join("nested");
        let store = FileModelStore::new(&dir).unwrap();
        assert!(store.dir().is_dir());
        fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn test_file_store_roundtrip_and_overwrite() {
        let dir = unique_temp_dir();
        let store = FileModelStore::new(&dir).unwrap();

        assert!(!store.contains(&key()).unwrap());
        assert_eq!(store.load(&key()).unwrap(), None);

        store.save(&key(), b"first").unwrap();
        store.save(&key(), b"second").unwrap();
        assert!(store.contains(&key()).unwrap());
        assert_eq!(store.load(&key()).unwrap().as_deref(), Some(&b"second"[..]));

        assert!(store.location(&key()).ends_with("bitcoin_7d.json"));
        assert!(!dir.join("bitcoin_7d.json.tmp").exists());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_keys_do_not_collide() {
        let dir = unique_temp_dir();
        let store = FileModelStore::new(&dir).unwrap();
        let week = ForecastKey::new("ethereum", 7).unwrap();
        let month = ForecastKey::new("ethereum", 30).unwrap();

        store.save(&week, b"w").unwrap();
        assert!(!store.contains(&month).unwrap());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryModelStore::new();
        assert!(store.is_empty());

        store.save(&key(), b"blob").unwrap();
        assert!(store.contains(&key()).unwrap());
        assert_eq!(store.load(&key()).unwrap(), Some(b"blob".to_vec()));
        assert_eq!(store.location(&key()), "memory://bitcoin_7d");
        assert_eq!(store.len(), 1);
    }
}
