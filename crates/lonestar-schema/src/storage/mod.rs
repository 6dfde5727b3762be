//! Storage backends for the schema registry
//!
//! This module provides pluggable persistence for raw schema documents:
//!
//! - **Memory**: in-memory storage for development and testing
//! - **File**: one JSON document per `(kind, version)` pair on disk
//!
//! Documents are stored verbatim in their nested-mapping shape; nothing
//! in the storage layer interprets metric definitions. Seeding tools
//! upsert through [`SchemaStore::put`] with last-write-wins,
//! whole-document replacement semantics.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::StorageConfig;
use crate::error::SchemaResult;
use crate::types::{RawSchemaDocument, SchemaKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage backend trait for raw schema documents
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Fetch the document for `(kind, version)`, if present
    async fn fetch(
        &self,
        kind: SchemaKind,
        version: &str,
    ) -> SchemaResult<Option<RawSchemaDocument>>;

    /// Upsert a document, replacing any previous content wholesale
    async fn put(&self, document: &RawSchemaDocument) -> SchemaResult<()>;

    /// List stored versions for a kind, in display order
    async fn versions(&self, kind: SchemaKind) -> SchemaResult<Vec<String>>;

    /// Check whether a document exists
    async fn exists(&self, kind: SchemaKind, version: &str) -> SchemaResult<bool> {
        Ok(self.fetch(kind, version).await?.is_some())
    }
}

/// Type alias for a shared storage backend
pub type Storage = Arc<dyn SchemaStore>;

/// Create a storage backend from configuration
pub fn create_storage(config: &StorageConfig) -> SchemaResult<Storage> {
    match config {
        StorageConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageConfig::File { root } => Ok(Arc::new(FileStore::new(root)?)),
    }
}
