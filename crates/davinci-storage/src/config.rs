//! Storage configuration and backend selection.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::sqlite::SqliteBookmarkStore;
use crate::store::{BookmarkStore, MemoryBookmarkStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database file for the sqlite backend.
    #[serde(default = "default_path")]
    pub path: Option<PathBuf>,
}

fn default_path() -> Option<PathBuf> {
    Some(PathBuf::from("davinci.db"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_path(),
        }
    }
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: None,
        }
    }
}

/// Opens the configured bookmark store.
pub fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn BookmarkStore>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory bookmark store");
            Ok(Arc::new(MemoryBookmarkStore::new()))
        }
        StorageBackend::Sqlite => {
            let path = config.path.as_deref().ok_or(StorageError::MissingPath)?;
            Ok(Arc::new(SqliteBookmarkStore::open(path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_without_path_is_rejected() {
        let config = StorageConfig {
            backend: StorageBackend::Sqlite,
            path: None,
        };
        assert!(matches!(open_store(&config), Err(StorageError::MissingPath)));
    }

    #[test]
    fn test_memory_backend_needs_no_path() {
        assert!(open_store(&StorageConfig::memory()).is_ok());
    }
}
