//! # Lonestar Schema Registry
//!
//! A metric-schema registry and ingest validation service for the
//! Lonestar HPC job-monitoring platform.
//!
//! ## Features
//!
//! - **Versioned catalogs**: immutable `summary` and `timeseries` schema
//!   documents keyed by `(kind, version)`
//! - **Compilation**: raw nested documents are validated and flattened
//!   into indexed, immutable catalogs; malformed input is rejected
//!   wholesale, including duplicate-path collisions
//! - **Wildcard paths**: device/host instance segments (`net.*.rx_bytes`)
//!   resolve against concrete query paths (`net.eth0.rx_bytes`)
//! - **Load-through caching**: compiled documents are cached until an
//!   explicit reload, which swaps the entry atomically; a failed reload
//!   keeps serving the last good document
//! - **Ingest validation**: per-sample accept/reject decisions (finite
//!   numbers for numeric metrics, text for metadata metrics)
//! - **Storage backends**: in-memory (development/testing) and
//!   file-backed (one JSON document per version)
//! - **Seeding**: a store-client seeding tool replaces ad-hoc database
//!   upsert scripts
//!
//! ## Architecture
//!
//! ```text
//! ingest pipeline ──▶ ValidationGateway ──▶ resolver
//!                           │                  │
//!                           ▼                  ▼
//!                     SchemaRegistry ──▶ SchemaDocument (compiled)
//!                           │                  ▲
//!                           ▼                  │
//!                      SchemaStore ──▶ compiler::compile
//!                      (memory/file)
//!                           ▲
//!                           │
//!                  Seeder (admin tooling)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lonestar_schema::{
//!     RegistryConfig, SampleValue, SchemaKind, SchemaRegistry, ValidationGateway,
//! };
//! use std::sync::Arc;
//!
//! let registry = Arc::new(SchemaRegistry::new(RegistryConfig::memory())?);
//! let gateway = ValidationGateway::new(registry.clone());
//!
//! let decision = gateway
//!     .validate(SchemaKind::Summary, "0.9.38", "cpu.user", &SampleValue::Number(42.0))
//!     .await?;
//! assert!(decision.is_accepted());
//! ```
//!
//! The `metrics` feature adds Prometheus counters for gateway decisions,
//! cache traffic, and reload outcomes.

pub mod compiler;
pub mod config;
pub mod error;
pub mod gateway;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod registry;
pub mod resolver;
pub mod seed;
pub mod storage;
pub mod types;

// Re-exports for convenience
pub use config::{RegistryConfig, StorageConfig};
pub use error::{SchemaError, SchemaResult};
pub use gateway::{Decision, RejectReason, SampleValue, ValidationGateway};
#[cfg(feature = "metrics")]
pub use metrics::SchemaMetrics;
pub use registry::SchemaRegistry;
pub use seed::{SeedReport, Seeder};
pub use storage::{create_storage, FileStore, MemoryStore, SchemaStore, Storage};
pub use types::{
    compare_versions, DocumentKey, MetricDescriptor, MetricPath, MetricSource, MetricType,
    PathSegment, RawSchemaDocument, SchemaDocument, SchemaKind,
};
