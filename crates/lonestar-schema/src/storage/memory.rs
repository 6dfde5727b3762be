//! In-memory storage backend for testing and development

use super::SchemaStore;
use crate::error::SchemaResult;
use crate::types::{compare_versions, DocumentKey, RawSchemaDocument, SchemaKind};
use async_trait::async_trait;
use dashmap::DashMap;

/// In-memory storage backend
pub struct MemoryStore {
    documents: DashMap<DocumentKey, RawSchemaDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Number of stored documents, across both kinds
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaStore for MemoryStore {
    async fn fetch(
        &self,
        kind: SchemaKind,
        version: &str,
    ) -> SchemaResult<Option<RawSchemaDocument>> {
        let key = DocumentKey::new(kind, version);
        Ok(self.documents.get(&key).map(|doc| doc.clone()))
    }

    async fn put(&self, document: &RawSchemaDocument) -> SchemaResult<()> {
        let key = DocumentKey::new(document.schema_type, document.version.clone());
        self.documents.insert(key, document.clone());
        Ok(())
    }

    async fn versions(&self, kind: SchemaKind) -> SchemaResult<Vec<String>> {
        let mut versions: Vec<String> = self
            .documents
            .iter()
            .filter(|entry| entry.key().kind == kind)
            .map(|entry| entry.key().version.clone())
            .collect();
        versions.sort_by(|a, b| compare_versions(a, b));
        Ok(versions)
    }

    async fn exists(&self, kind: SchemaKind, version: &str) -> SchemaResult<bool> {
        Ok(self.documents.contains_key(&DocumentKey::new(kind, version)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary_doc(version: &str) -> RawSchemaDocument {
        serde_json::from_value(json!({
            "schema_type": "summary",
            "version": version,
            "definitions": { "cpu": { "user": { "type": "rate", "unit": "cs/s" } } },
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let doc = summary_doc("0.9.33");

        store.put(&doc).await.unwrap();
        let fetched = store
            .fetch(SchemaKind::Summary, "0.9.33")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, doc);

        assert!(store.exists(SchemaKind::Summary, "0.9.33").await.unwrap());
        assert!(!store.exists(SchemaKind::Timeseries, "0.9.33").await.unwrap());
        assert!(store
            .fetch(SchemaKind::Summary, "0.9.34")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_memory_store_upsert_replaces_wholesale() {
        let store = MemoryStore::new();
        store.put(&summary_doc("0.9.33")).await.unwrap();

        let mut replacement = summary_doc("0.9.33");
        replacement.definitions = json!({
            "mem": { "MemUsed": { "type": "instant", "unit": "B" } },
        })
        .as_object()
        .cloned()
        .unwrap();
        store.put(&replacement).await.unwrap();

        let fetched = store
            .fetch(SchemaKind::Summary, "0.9.33")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, replacement);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_versions_sorted() {
        let store = MemoryStore::new();
        for version in ["0.9.33", "0.9.9", "0.9.28"] {
            store.put(&summary_doc(version)).await.unwrap();
        }

        let versions = store.versions(SchemaKind::Summary).await.unwrap();
        assert_eq!(versions, vec!["0.9.9", "0.9.28", "0.9.33"]);
        assert!(store
            .versions(SchemaKind::Timeseries)
            .await
            .unwrap()
            .is_empty());
    }
}
