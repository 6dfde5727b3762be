//! Registry configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the schema registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Storage backend configuration
    pub storage: StorageConfig,
}

impl RegistryConfig {
    /// Create config with in-memory storage
    pub fn memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
        }
    }

    /// Create config with file-backed storage rooted at `root`
    pub fn file(root: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig::File { root: root.into() },
        }
    }

    /// Set the storage backend
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }
}

/// Storage backend configuration
///
/// - **Memory**: in-memory storage for development and testing
/// - **File**: one JSON document per `(kind, version)` pair under a root
///   directory, the registry's durable backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (default for development)
    #[default]
    Memory,

    /// File-backed storage
    File { root: PathBuf },
}
