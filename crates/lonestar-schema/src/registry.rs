//! Schema registry - load-through cache of compiled documents
//!
//! The registry owns the process-wide cache of compiled schema documents,
//! keyed by `(kind, version)`. Misses load through the configured
//! [`SchemaStore`](crate::storage::SchemaStore) and compile before
//! insertion; entries then live until an explicit [`reload`] or
//! [`evict`].
//!
//! Concurrency: the cache is the only shared mutable state. Compilation
//! happens outside any map lock, and publishing a document is a single
//! insert of a new `Arc`, so concurrent readers observe either the old or
//! the new document in full, never a mix. A failed reload (missing or
//! malformed document) leaves the previously cached good document
//! authoritative.
//!
//! [`reload`]: SchemaRegistry::reload
//! [`evict`]: SchemaRegistry::evict

use crate::compiler;
use crate::config::RegistryConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::storage::{create_storage, Storage};
use crate::types::{DocumentKey, SchemaDocument, SchemaKind};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[cfg(feature = "metrics")]
use crate::metrics::SchemaMetrics;

/// Process-wide cache of compiled schema documents
pub struct SchemaRegistry {
    /// Storage backend
    store: Storage,
    /// Compiled documents by `(kind, version)`
    cache: DashMap<DocumentKey, Arc<SchemaDocument>>,
    /// Prometheus metrics (optional)
    #[cfg(feature = "metrics")]
    metrics: Option<Arc<SchemaMetrics>>,
}

impl SchemaRegistry {
    /// Create a registry from configuration
    pub fn new(config: RegistryConfig) -> SchemaResult<Self> {
        let store = create_storage(&config.storage)?;
        Ok(Self::with_store(store))
    }

    /// Create a registry over an explicit storage backend
    pub fn with_store(store: Storage) -> Self {
        Self {
            store,
            cache: DashMap::new(),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Attach Prometheus metrics
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: Arc<SchemaMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The underlying storage backend
    pub fn store(&self) -> &Storage {
        &self.store
    }

    /// Number of cached documents
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Get the compiled document for `(kind, version)`
    ///
    /// Loads through the store on a cache miss and caches the compiled
    /// result until an explicit [`SchemaRegistry::reload`] or
    /// [`SchemaRegistry::evict`].
    pub async fn get(
        &self,
        kind: SchemaKind,
        version: &str,
    ) -> SchemaResult<Arc<SchemaDocument>> {
        let key = DocumentKey::new(kind, version);
        if let Some(document) = self.cache.get(&key) {
            #[cfg(feature = "metrics")]
            if let Some(ref metrics) = self.metrics {
                metrics.record_cache_hit();
            }
            return Ok(document.clone());
        }

        #[cfg(feature = "metrics")]
        if let Some(ref metrics) = self.metrics {
            metrics.record_cache_miss();
        }
        debug!(key = %key, "cache miss, loading schema from store");
        self.load(key).await
    }

    /// Force a re-fetch and recompilation of `(kind, version)`
    ///
    /// On success the cache entry is swapped atomically. On failure the
    /// error propagates and any previously cached good document stays
    /// authoritative - stale-but-valid data is preferred over no data.
    pub async fn reload(
        &self,
        kind: SchemaKind,
        version: &str,
    ) -> SchemaResult<Arc<SchemaDocument>> {
        let key = DocumentKey::new(kind, version);
        info!(key = %key, "reloading schema document");
        let result = self.load(key.clone()).await;
        match &result {
            Ok(document) => {
                info!(key = %key, descriptors = document.len(), "schema reloaded");
                #[cfg(feature = "metrics")]
                if let Some(ref metrics) = self.metrics {
                    metrics.record_reload(true);
                }
            }
            Err(e) => {
                warn!(key = %key, error = %e, "schema reload failed, cached document kept");
                #[cfg(feature = "metrics")]
                if let Some(ref metrics) = self.metrics {
                    metrics.record_reload(false);
                }
            }
        }
        result
    }

    /// Drop the cache entry for `(kind, version)`, if present
    ///
    /// The next [`SchemaRegistry::get`] loads through the store again.
    pub fn evict(&self, kind: SchemaKind, version: &str) -> bool {
        self.cache
            .remove(&DocumentKey::new(kind, version))
            .is_some()
    }

    async fn load(&self, key: DocumentKey) -> SchemaResult<Arc<SchemaDocument>> {
        let raw = self
            .store
            .fetch(key.kind, &key.version)
            .await?
            .ok_or_else(|| SchemaError::UnknownVersion(key.clone()))?;

        if raw.schema_type != key.kind || raw.version != key.version {
            return Err(SchemaError::Storage(format!(
                "store returned document '{}-{}' for requested key '{}'",
                raw.schema_type, raw.version, key
            )));
        }

        let document = Arc::new(compiler::compile(&raw)?);
        self.cache.insert(key, document.clone());
        Ok(document)
    }
}
