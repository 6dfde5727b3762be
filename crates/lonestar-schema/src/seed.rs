//! Schema seeding
//!
//! Loads raw schema documents from seed files into a store through the
//! [`SchemaStore`](crate::storage::SchemaStore) interface. A seed file
//! holds a single entry or an array of entries; an entry may name a list
//! of `versions` instead of a single `version`, in which case the same
//! definitions are stored once per listed version. Re-seeding upserts
//! with last-write-wins, whole-document replacement semantics.
//!
//! Every expanded document is compiled before it is written, so a
//! malformed seed never reaches the store.

use crate::compiler;
use crate::error::{SchemaError, SchemaResult};
use crate::storage::Storage;
use crate::types::{DocumentKey, RawSchemaDocument, SchemaKind};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

/// One entry in a seed file
///
/// Exactly one of `version` and `versions` must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    pub schema_type: SchemaKind,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub versions: Vec<String>,
    pub definitions: Map<String, Value>,
}

impl SeedEntry {
    fn target_versions(&self) -> SchemaResult<Vec<String>> {
        match (&self.version, self.versions.is_empty()) {
            (Some(version), true) => Ok(vec![version.clone()]),
            (None, false) => Ok(self.versions.clone()),
            (Some(_), false) => Err(SchemaError::Malformed(
                "seed entry must carry 'version' or 'versions', not both".to_string(),
            )),
            (None, true) => Err(SchemaError::Malformed(
                "seed entry must carry a 'version' or a non-empty 'versions' list".to_string(),
            )),
        }
    }
}

/// What a seeding run wrote
#[derive(Debug, Default)]
pub struct SeedReport {
    /// Keys of every stored document, in write order
    pub stored: Vec<DocumentKey>,
}

impl SeedReport {
    pub fn documents(&self) -> usize {
        self.stored.len()
    }
}

/// Seeding tool: a client of the store, not of any ambient database handle
pub struct Seeder {
    store: Storage,
}

impl Seeder {
    pub fn new(store: Storage) -> Self {
        Self { store }
    }

    /// Seed from a JSON string holding one entry or an array of entries
    pub async fn seed_str(&self, content: &str) -> SchemaResult<SeedReport> {
        let value: Value = serde_json::from_str(content)?;
        let entries: Vec<SeedEntry> = match value {
            Value::Array(_) => serde_json::from_value(value)?,
            Value::Object(_) => vec![serde_json::from_value(value)?],
            _ => {
                return Err(SchemaError::Malformed(
                    "seed content must be a JSON object or array of objects".to_string(),
                ))
            }
        };

        let mut report = SeedReport::default();
        for entry in &entries {
            self.seed_entry(entry, &mut report).await?;
        }
        Ok(report)
    }

    /// Seed from a file
    pub async fn seed_file(&self, path: impl AsRef<Path>) -> SchemaResult<SeedReport> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        self.seed_str(&content).await
    }

    async fn seed_entry(&self, entry: &SeedEntry, report: &mut SeedReport) -> SchemaResult<()> {
        for version in entry.target_versions()? {
            let document = RawSchemaDocument {
                schema_type: entry.schema_type,
                version,
                definitions: entry.definitions.clone(),
            };
            // Reject malformed definitions before anything hits the store
            compiler::compile(&document)?;
            self.store.put(&document).await?;
            let key = DocumentKey::new(document.schema_type, document.version);
            info!(key = %key, "seeded schema document");
            report.stored.push(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SchemaStore};
    use std::sync::Arc;

    fn seeder() -> (Arc<MemoryStore>, Seeder) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Seeder::new(store))
    }

    #[tokio::test]
    async fn test_seed_single_entry() {
        let (store, seeder) = seeder();
        let report = seeder
            .seed_str(
                r#"{
                    "schema_type": "summary",
                    "version": "0.9.33",
                    "definitions": { "cpu": { "user": { "type": "rate", "unit": "cs/s" } } }
                }"#,
            )
            .await
            .unwrap();

        assert_eq!(report.documents(), 1);
        assert_eq!(report.stored[0].to_string(), "summary-0.9.33");
        assert!(store.exists(SchemaKind::Summary, "0.9.33").await.unwrap());
    }

    #[tokio::test]
    async fn test_seed_expands_version_list() {
        let (store, seeder) = seeder();
        let report = seeder
            .seed_str(
                r#"{
                    "schema_type": "summary",
                    "versions": ["0.9.28", "0.9.30", "0.9.31", "0.9.33"],
                    "definitions": { "cpu": { "user": { "type": "rate", "unit": "cs/s" } } }
                }"#,
            )
            .await
            .unwrap();

        assert_eq!(report.documents(), 4);
        let versions = store.versions(SchemaKind::Summary).await.unwrap();
        assert_eq!(versions, vec!["0.9.28", "0.9.30", "0.9.31", "0.9.33"]);
    }

    #[tokio::test]
    async fn test_seed_array_of_entries() {
        let (store, seeder) = seeder();
        let report = seeder
            .seed_str(
                r#"[
                    {
                        "schema_type": "summary",
                        "version": "0.9.34",
                        "definitions": { "cpu": { "user": { "type": "rate", "unit": "cs/s" } } }
                    },
                    {
                        "schema_type": "timeseries",
                        "version": "4",
                        "definitions": { "cpuuser": { "type": "instant", "unit": "%" } }
                    }
                ]"#,
            )
            .await
            .unwrap();

        assert_eq!(report.documents(), 2);
        assert!(store.exists(SchemaKind::Summary, "0.9.34").await.unwrap());
        assert!(store.exists(SchemaKind::Timeseries, "4").await.unwrap());
    }

    #[tokio::test]
    async fn test_seed_rejects_malformed_definitions() {
        let (store, seeder) = seeder();
        let err = seeder
            .seed_str(
                r#"{
                    "schema_type": "summary",
                    "version": "0.9.33",
                    "definitions": { "cpu": { "user": { "unit": "cs/s" } } }
                }"#,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SchemaError::Malformed(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_seed_rejects_entry_without_version() {
        let (_, seeder) = seeder();
        let err = seeder
            .seed_str(
                r#"{
                    "schema_type": "summary",
                    "definitions": { "cpu": { "user": { "type": "rate", "unit": "cs/s" } } }
                }"#,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_reseeding_overwrites() {
        let (store, seeder) = seeder();
        let entry = |unit: &str| {
            format!(
                r#"{{
                    "schema_type": "summary",
                    "version": "0.9.33",
                    "definitions": {{ "cpu": {{ "user": {{ "type": "rate", "unit": "{}" }} }} }}
                }}"#,
                unit
            )
        };

        seeder.seed_str(&entry("cs/s")).await.unwrap();
        seeder.seed_str(&entry("ms/s")).await.unwrap();

        let doc = store
            .fetch(SchemaKind::Summary, "0.9.33")
            .await
            .unwrap()
            .unwrap();
        let unit = &doc.definitions["cpu"]["user"]["unit"];
        assert_eq!(unit, "ms/s");
        assert_eq!(store.len(), 1);
    }
}
