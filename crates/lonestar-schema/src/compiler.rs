//! Schema compilation
//!
//! Turns a [`RawSchemaDocument`] into an immutable, indexed
//! [`SchemaDocument`]. Compilation is all-or-nothing: any structural
//! defect rejects the whole document, and a duplicate flattened path is a
//! hard error rather than a silent overwrite, so no metric can shadow
//! another.
//!
//! Unit strings are opaque tokens. Rate suffixes (`/s`, `B/s`, `ms/s`,
//! `cs/s`, `mJ/s`, `us/s`) are preserved verbatim; no unit arithmetic or
//! canonicalization happens here.

use crate::error::{SchemaError, SchemaResult};
use crate::types::{
    MetricDescriptor, MetricPath, MetricSource, MetricType, PathSegment, RawSchemaDocument,
    SchemaDocument,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Compile a raw document into an indexed catalog
///
/// Pure function over its input; rejects with
/// [`SchemaError::Malformed`] on any structural defect.
pub fn compile(raw: &RawSchemaDocument) -> SchemaResult<SchemaDocument> {
    if raw.definitions.is_empty() {
        return Err(SchemaError::Malformed(
            "document has no metric definitions".to_string(),
        ));
    }

    let mut by_path = HashMap::new();
    let mut prefix = Vec::new();
    walk_group(&raw.definitions, &mut prefix, &mut by_path)?;

    if by_path.is_empty() {
        return Err(SchemaError::Malformed(
            "document compiles to zero metric descriptors".to_string(),
        ));
    }

    debug!(
        kind = %raw.schema_type,
        version = %raw.version,
        descriptors = by_path.len(),
        "compiled schema document"
    );

    Ok(SchemaDocument::from_parts(
        raw.schema_type,
        raw.version.clone(),
        by_path,
    ))
}

/// A leaf is any object carrying a string-valued `type` key
fn is_leaf(node: &Map<String, Value>) -> bool {
    matches!(node.get("type"), Some(Value::String(_)))
}

fn walk_group(
    group: &Map<String, Value>,
    prefix: &mut Vec<PathSegment>,
    out: &mut HashMap<String, MetricDescriptor>,
) -> SchemaResult<()> {
    for (key, value) in group {
        prefix.push(PathSegment::from_key(key));
        let result = match value {
            Value::Object(node) if is_leaf(node) => insert_descriptor(node, prefix, out),
            Value::Object(node) => walk_group(node, prefix, out),
            _ => Err(SchemaError::Malformed(format!(
                "definition at '{}' is neither a group nor a typed metric leaf",
                flatten(prefix)
            ))),
        };
        prefix.pop();
        result?;
    }
    Ok(())
}

fn insert_descriptor(
    node: &Map<String, Value>,
    prefix: &[PathSegment],
    out: &mut HashMap<String, MetricDescriptor>,
) -> SchemaResult<()> {
    let path = MetricPath::new(prefix.to_vec());
    let flattened = path.flatten();

    let value_type = match node.get("type") {
        Some(Value::String(raw_type)) => raw_type
            .parse::<MetricType>()
            .map_err(|e| SchemaError::Malformed(format!("{} at '{}'", e, flattened)))?,
        _ => {
            return Err(SchemaError::Malformed(format!(
                "metric leaf at '{}' is missing a 'type'",
                flattened
            )))
        }
    };

    let unit = match node.get("unit") {
        None => String::new(),
        Some(Value::String(unit)) => unit.clone(),
        Some(_) => {
            return Err(SchemaError::Malformed(format!(
                "unit at '{}' must be a string",
                flattened
            )))
        }
    };

    if value_type == MetricType::Metadata && !unit.is_empty() {
        return Err(SchemaError::Malformed(format!(
            "metadata metric at '{}' must not carry a unit (got '{}')",
            flattened, unit
        )));
    }

    let documentation = match node.get("documentation") {
        None => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            return Err(SchemaError::Malformed(format!(
                "documentation at '{}' must be a string",
                flattened
            )))
        }
    };

    let source = match node.get("source") {
        None => None,
        Some(value) => Some(
            serde_json::from_value::<MetricSource>(value.clone()).map_err(|e| {
                SchemaError::Malformed(format!("invalid source at '{}': {}", flattened, e))
            })?,
        ),
    };

    let descriptor = MetricDescriptor {
        path,
        value_type,
        unit,
        documentation,
        source,
    };

    if out.insert(flattened.clone(), descriptor).is_some() {
        return Err(SchemaError::Malformed(format!(
            "duplicate metric path '{}'",
            flattened
        )));
    }
    Ok(())
}

fn flatten(prefix: &[PathSegment]) -> String {
    MetricPath::new(prefix.to_vec()).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SchemaKind;
    use serde_json::json;

    fn raw(definitions: Value) -> RawSchemaDocument {
        serde_json::from_value(json!({
            "schema_type": "summary",
            "version": "0.9.33",
            "definitions": definitions,
        }))
        .unwrap()
    }

    #[test]
    fn test_compile_preserves_cardinality() {
        let doc = compile(&raw(json!({
            "cpiref": { "type": "ratio", "unit": "1" },
            "cpu": {
                "user": { "type": "rate", "unit": "cs/s" },
                "system": { "type": "rate", "unit": "cs/s" },
            },
            "net": {
                "*": {
                    "rx_bytes": { "type": "rate", "unit": "B/s" },
                    "tx_bytes": { "type": "rate", "unit": "B/s" },
                }
            },
            "Error": { "type": "metadata" },
        })))
        .unwrap();

        assert_eq!(doc.len(), 6);
        assert_eq!(doc.kind(), SchemaKind::Summary);
        assert_eq!(doc.version(), "0.9.33");
        assert_eq!(doc.get("cpu.user").unwrap().unit, "cs/s");
        assert_eq!(
            doc.get("net.*.rx_bytes").unwrap().value_type,
            MetricType::Rate
        );
        assert!(doc.get("net.*.rx_bytes").unwrap().path.has_wildcard());
    }

    #[test]
    fn test_compile_keeps_source_and_documentation() {
        let doc = compile(&raw(json!({
            "vm": {
                "*": {
                    "pgpgin": {
                        "type": "rate",
                        "unit": "/s",
                        "documentation": "procfs metric read from /proc/vmstat",
                        "source": { "type": "procfs", "name": "/proc/vmstat" },
                    }
                }
            }
        })))
        .unwrap();

        let descriptor = doc.get("vm.*.pgpgin").unwrap();
        assert_eq!(
            descriptor.documentation.as_deref(),
            Some("procfs metric read from /proc/vmstat")
        );
        let source = descriptor.source.as_ref().unwrap();
        assert_eq!(source.source_type, "procfs");
        assert_eq!(source.name, "/proc/vmstat");
    }

    #[test]
    fn test_compile_rejects_duplicate_flattened_path() {
        // "a.b" as a literal key and "a" -> "b" normalize to the same path
        let err = compile(&raw(json!({
            "a.b": { "type": "rate", "unit": "/s" },
            "a": { "b": { "type": "instant", "unit": "B" } },
        })))
        .unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(ref msg) if msg.contains("a.b")));
    }

    #[test]
    fn test_compile_rejects_missing_type() {
        let err = compile(&raw(json!({
            "cpu": { "user": { "unit": "cs/s" } },
        })))
        .unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }

    #[test]
    fn test_compile_rejects_unknown_type() {
        let err = compile(&raw(json!({
            "cpu": { "user": { "type": "gauge", "unit": "cs/s" } },
        })))
        .unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(ref msg) if msg.contains("gauge")));
    }

    #[test]
    fn test_compile_rejects_non_string_unit() {
        let err = compile(&raw(json!({
            "cpu": { "user": { "type": "rate", "unit": 7 } },
        })))
        .unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(ref msg) if msg.contains("unit")));
    }

    #[test]
    fn test_compile_rejects_metadata_with_unit() {
        let err = compile(&raw(json!({
            "Error": { "type": "metadata", "unit": "B" },
        })))
        .unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(ref msg) if msg.contains("metadata")));
    }

    #[test]
    fn test_compile_rejects_scalar_in_group() {
        let err = compile(&raw(json!({
            "cpu": { "user": "cs/s" },
        })))
        .unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }

    #[test]
    fn test_compile_rejects_empty_document() {
        let err = compile(&raw(json!({}))).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));

        // Nested groups with no leaves are just as empty
        let err = compile(&raw(json!({ "cpu": {}, "net": { "*": {} } }))).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }

    #[test]
    fn test_compile_round_trips_through_raw() {
        let original = raw(json!({
            "cpiref": { "type": "ratio", "unit": "1", "documentation": "ticks per instruction" },
            "net": { "*": { "rx_bytes": { "type": "rate", "unit": "B/s" } } },
            "mem": { "MemUsed": {
                "type": "instant",
                "unit": "B",
                "source": { "type": "sysfs", "name": "/sys/devices/system/node/node*/meminfo" },
            } },
            "Error": { "type": "metadata" },
        }));

        let compiled = compile(&original).unwrap();
        let recompiled = compile(&compiled.to_raw()).unwrap();
        assert_eq!(compiled, recompiled);
    }
}
