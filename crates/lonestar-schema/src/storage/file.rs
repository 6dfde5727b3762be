//! File-backed storage backend
//!
//! Persists one pretty-printed JSON document per `(kind, version)` pair
//! under a root directory, named `<kind>-<version>.json`. Upserts write to
//! a temporary file and rename over the target, so a reader never observes
//! a half-written document.

use super::SchemaStore;
use crate::error::{SchemaError, SchemaResult};
use crate::types::{compare_versions, RawSchemaDocument, SchemaKind};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed storage backend
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> SchemaResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, kind: SchemaKind, version: &str) -> SchemaResult<PathBuf> {
        if version.is_empty()
            || !version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(SchemaError::Config(format!(
                "invalid version token '{}': expected ASCII letters, digits, '.', '_' or '-'",
                version
            )));
        }
        Ok(self.root.join(format!("{}-{}.json", kind, version)))
    }
}

#[async_trait]
impl SchemaStore for FileStore {
    async fn fetch(
        &self,
        kind: SchemaKind,
        version: &str,
    ) -> SchemaResult<Option<RawSchemaDocument>> {
        let path = self.document_path(kind, version)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document: RawSchemaDocument = serde_json::from_slice(&bytes)?;
        Ok(Some(document))
    }

    async fn put(&self, document: &RawSchemaDocument) -> SchemaResult<()> {
        let path = self.document_path(document.schema_type, &document.version)?;
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(document)?;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "stored schema document");
        Ok(())
    }

    async fn versions(&self, kind: SchemaKind) -> SchemaResult<Vec<String>> {
        let prefix = format!("{}-", kind);
        let mut versions = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(version) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".json"))
            {
                versions.push(version.to_string());
            }
        }
        versions.sort_by(|a, b| compare_versions(a, b));
        Ok(versions)
    }

    async fn exists(&self, kind: SchemaKind, version: &str) -> SchemaResult<bool> {
        Ok(tokio::fs::try_exists(self.document_path(kind, version)?).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn raw_doc(kind: &str, version: &str) -> RawSchemaDocument {
        serde_json::from_value(json!({
            "schema_type": kind,
            "version": version,
            "definitions": { "cpu": { "user": { "type": "rate", "unit": "cs/s" } } },
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let doc = raw_doc("summary", "0.9.33");
        store.put(&doc).await.unwrap();

        let fetched = store
            .fetch(SchemaKind::Summary, "0.9.33")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, doc);
        assert!(dir.path().join("summary-0.9.33.json").exists());
        assert!(store.exists(SchemaKind::Summary, "0.9.33").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_store_missing_document() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(store
            .fetch(SchemaKind::Summary, "0.9.99")
            .await
            .unwrap()
            .is_none());
        assert!(!store.exists(SchemaKind::Summary, "0.9.99").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_store_versions_per_kind() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        for version in ["0.9.33", "0.9.9"] {
            store.put(&raw_doc("summary", version)).await.unwrap();
        }
        store.put(&raw_doc("timeseries", "4")).await.unwrap();

        let summary = store.versions(SchemaKind::Summary).await.unwrap();
        assert_eq!(summary, vec!["0.9.9", "0.9.33"]);
        let timeseries = store.versions(SchemaKind::Timeseries).await.unwrap();
        assert_eq!(timeseries, vec!["4"]);
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_traversal_version() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let doc = RawSchemaDocument {
            schema_type: SchemaKind::Summary,
            version: "../evil".to_string(),
            definitions: raw_doc("summary", "1").definitions,
        };
        let err = store.put(&doc).await.unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }
}
