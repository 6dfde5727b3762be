//! Core types for the metric-schema registry
//!
//! This module provides:
//! - [`SchemaKind`], [`DocumentKey`] - document identifiers
//! - [`MetricType`], [`MetricSource`], [`MetricDescriptor`] - per-metric definitions
//! - [`PathSegment`], [`MetricPath`] - dotted metric paths with wildcard segments
//! - [`RawSchemaDocument`] - the nested mapping shape persisted in the store
//! - [`SchemaDocument`] - the compiled, indexed, immutable catalog

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Kind of schema document held by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Per-job summary catalog (the full metric set)
    Summary,
    /// Time-series catalog (the smaller plotted subset)
    Timeseries,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Timeseries => "timeseries",
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SchemaKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "timeseries" => Ok(Self::Timeseries),
            other => Err(format!(
                "unknown schema kind '{}'; expected 'summary' or 'timeseries'",
                other
            )),
        }
    }
}

/// Classification of a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Per-interval rate (unit typically carries a `/s` suffix)
    Rate,
    /// Point-in-time reading
    Instant,
    /// Dimensionless ratio
    Ratio,
    /// Discrete count
    Discrete,
    /// Non-numeric payload (e.g. a list of processing errors)
    Metadata,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Instant => "instant",
            Self::Ratio => "ratio",
            Self::Discrete => "discrete",
            Self::Metadata => "metadata",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MetricType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "rate" => Ok(Self::Rate),
            "instant" => Ok(Self::Instant),
            "ratio" => Ok(Self::Ratio),
            "discrete" => Ok(Self::Discrete),
            "metadata" => Ok(Self::Metadata),
            other => Err(format!(
                "unknown metric type '{}'; expected one of rate, instant, ratio, discrete, metadata",
                other
            )),
        }
    }
}

/// One component of a metric path
///
/// The wildcard marker (`"*"` in the raw document) is kept as a
/// distinguished segment kind, not as the literal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Literal(String),
    Wildcard,
}

impl PathSegment {
    /// Interpret a raw mapping key as a path segment
    pub fn from_key(key: &str) -> Self {
        if key == "*" {
            Self::Wildcard
        } else {
            Self::Literal(key.to_string())
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(name) => write!(f, "{}", name),
            Self::Wildcard => write!(f, "*"),
        }
    }
}

/// Ordered, non-empty sequence of path segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricPath(Vec<PathSegment>);

impl MetricPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Number of segments
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn has_wildcard(&self) -> bool {
        self.0.iter().any(PathSegment::is_wildcard)
    }

    /// Structural match against a concrete query path
    ///
    /// A wildcard segment matches exactly one concrete segment; literal
    /// segments match verbatim. Segment counts must be equal.
    pub fn matches(&self, concrete: &[&str]) -> bool {
        self.0.len() == concrete.len()
            && self.0.iter().zip(concrete).all(|(seg, name)| match seg {
                PathSegment::Wildcard => true,
                PathSegment::Literal(literal) => literal == name,
            })
    }

    /// Flattened dotted form, with `*` for wildcard segments
    pub fn flatten(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for MetricPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Provenance of a metric (e.g. the kernel interface it is read from)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSource {
    /// Collector kind, e.g. `procfs`, `sysfs`, `syscall`
    #[serde(rename = "type")]
    pub source_type: String,
    /// Collector-specific name, e.g. `/proc/vmstat`
    pub name: String,
}

/// Typed definition of one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    /// Path within the catalog, wildcard segments preserved
    pub path: MetricPath,
    /// Value classification
    pub value_type: MetricType,
    /// Opaque unit token, empty when the metric has none; rate suffixes
    /// such as `B/s` or `cs/s` are preserved verbatim
    pub unit: String,
    /// Human-readable description
    pub documentation: Option<String>,
    /// Where the value is collected from
    pub source: Option<MetricSource>,
}

/// Identifier of one document in the store: `(kind, version)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub kind: SchemaKind,
    pub version: String,
}

impl DocumentKey {
    pub fn new(kind: SchemaKind, version: impl Into<String>) -> Self {
        Self {
            kind,
            version: version.into(),
        }
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.kind, self.version)
    }
}

/// Raw schema document as persisted in the store
///
/// `definitions` is a nested mapping: group names map to either further
/// groups, a `"*"` wildcard level, or a typed metric leaf. A leaf is any
/// object carrying a string-valued `"type"` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSchemaDocument {
    pub schema_type: SchemaKind,
    pub version: String,
    pub definitions: Map<String, Value>,
}

/// Compiled, immutable schema catalog
///
/// Produced exclusively by [`crate::compiler::compile`]. Descriptors are
/// indexed by their flattened path; wildcard-bearing paths are tracked
/// separately so resolution can check the exact map first.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    kind: SchemaKind,
    version: String,
    by_path: HashMap<String, MetricDescriptor>,
    wildcard_paths: Vec<String>,
}

impl SchemaDocument {
    pub(crate) fn from_parts(
        kind: SchemaKind,
        version: String,
        by_path: HashMap<String, MetricDescriptor>,
    ) -> Self {
        let mut wildcard_paths: Vec<String> = by_path
            .iter()
            .filter(|(_, desc)| desc.path.has_wildcard())
            .map(|(key, _)| key.clone())
            .collect();
        wildcard_paths.sort();
        Self {
            kind,
            version,
            by_path,
            wildcard_paths,
        }
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(self.kind, self.version.clone())
    }

    /// Number of descriptors in the catalog
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Look up a descriptor by its flattened path string
    pub fn get(&self, flattened: &str) -> Option<&MetricDescriptor> {
        self.by_path.get(flattened)
    }

    /// Iterate over all descriptors, unordered
    pub fn descriptors(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.by_path.values()
    }

    /// Iterate over wildcard-bearing descriptors in flattened-path order
    pub(crate) fn wildcard_descriptors(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.wildcard_paths
            .iter()
            .filter_map(move |key| self.by_path.get(key))
    }

    /// Serialize back into the nested raw document shape
    ///
    /// Inverse of compilation up to structural equality: recompiling the
    /// result yields an equal document.
    pub fn to_raw(&self) -> RawSchemaDocument {
        let mut definitions = Map::new();
        let mut keys: Vec<&String> = self.by_path.keys().collect();
        keys.sort();
        for key in keys {
            let descriptor = &self.by_path[key];
            insert_leaf(
                &mut definitions,
                descriptor.path.segments(),
                leaf_value(descriptor),
            );
        }
        RawSchemaDocument {
            schema_type: self.kind,
            version: self.version.clone(),
            definitions,
        }
    }
}

fn leaf_value(descriptor: &MetricDescriptor) -> Value {
    let mut leaf = Map::new();
    leaf.insert(
        "type".to_string(),
        Value::String(descriptor.value_type.as_str().to_string()),
    );
    if !descriptor.unit.is_empty() || descriptor.value_type != MetricType::Metadata {
        leaf.insert("unit".to_string(), Value::String(descriptor.unit.clone()));
    }
    if let Some(ref documentation) = descriptor.documentation {
        leaf.insert(
            "documentation".to_string(),
            Value::String(documentation.clone()),
        );
    }
    if let Some(ref source) = descriptor.source {
        let mut node = Map::new();
        node.insert(
            "type".to_string(),
            Value::String(source.source_type.clone()),
        );
        node.insert("name".to_string(), Value::String(source.name.clone()));
        leaf.insert("source".to_string(), Value::Object(node));
    }
    Value::Object(leaf)
}

fn insert_leaf(node: &mut Map<String, Value>, segments: &[PathSegment], leaf: Value) {
    match segments {
        [] => {}
        [last] => {
            node.insert(last.to_string(), leaf);
        }
        [head, rest @ ..] => {
            let child = node
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = child {
                insert_leaf(map, rest, leaf);
            }
        }
    }
}

/// Numeric-aware version ordering for display (`0.9.9` < `0.9.10`)
///
/// Versions are otherwise opaque tokens; the registry itself never
/// interprets them.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(m), Ok(n)) => m.cmp(&n),
                    _ => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}
