//! Metric path resolution
//!
//! Resolves a concrete, fully-instantiated query path (e.g.
//! `net.eth0.rx_bytes`) against a compiled catalog. Wildcard segments in a
//! stored path match any single concrete segment at the same position;
//! segment counts must match exactly, so there is no prefix or suffix
//! matching. An unresolvable path is a normal "not instrumented"
//! condition and yields an empty result.

use crate::types::{MetricDescriptor, SchemaDocument};

/// Resolve a query path to its matching descriptors
///
/// Checks the exact-path index first, then wildcard-bearing descriptors
/// in flattened-path order. Paths are unique per document, so in practice
/// this returns zero or one descriptor; the sequence contract leaves room
/// for alias expansion without an interface change.
pub fn resolve<'a>(doc: &'a SchemaDocument, query: &str) -> Vec<&'a MetricDescriptor> {
    if query.is_empty() {
        return Vec::new();
    }

    if let Some(descriptor) = doc.get(query) {
        return vec![descriptor];
    }

    let segments: Vec<&str> = query.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Vec::new();
    }

    doc.wildcard_descriptors()
        .filter(|descriptor| descriptor.path.matches(&segments))
        .collect()
}
