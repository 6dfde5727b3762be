//! Prometheus metrics for the schema registry
//!
//! Counters:
//! - `schema_registry_samples_total{outcome, reason}` - gateway decisions
//! - `schema_registry_cache_hits_total` / `schema_registry_cache_misses_total`
//! - `schema_registry_reloads_total{outcome}` - reload attempts
//!
//! Attach one instance to both the registry and the gateway:
//!
//! ```rust,ignore
//! let metrics = Arc::new(SchemaMetrics::new()?);
//! let registry = Arc::new(SchemaRegistry::with_store(store).with_metrics(metrics.clone()));
//! let gateway = ValidationGateway::new(registry).with_metrics(metrics.clone());
//! println!("{}", metrics.render()?);
//! ```

use crate::error::{SchemaError, SchemaResult};
use crate::gateway::Decision;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Prometheus metrics shared by the registry and the gateway
pub struct SchemaMetrics {
    registry: Registry,
    samples: IntCounterVec,
    cache_hits: IntCounter,
    cache_misses: IntCounter,
    reloads: IntCounterVec,
}

impl SchemaMetrics {
    pub fn new() -> SchemaResult<Self> {
        let registry = Registry::new();

        let samples = IntCounterVec::new(
            Opts::new(
                "schema_registry_samples_total",
                "Validation decisions by outcome and rejection reason",
            ),
            &["outcome", "reason"],
        )
        .map_err(|e| SchemaError::Config(e.to_string()))?;

        let cache_hits = IntCounter::new(
            "schema_registry_cache_hits_total",
            "Compiled-document cache hits",
        )
        .map_err(|e| SchemaError::Config(e.to_string()))?;

        let cache_misses = IntCounter::new(
            "schema_registry_cache_misses_total",
            "Compiled-document cache misses",
        )
        .map_err(|e| SchemaError::Config(e.to_string()))?;

        let reloads = IntCounterVec::new(
            Opts::new("schema_registry_reloads_total", "Reload attempts by outcome"),
            &["outcome"],
        )
        .map_err(|e| SchemaError::Config(e.to_string()))?;

        for collector in [
            Box::new(samples.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(cache_hits.clone()),
            Box::new(cache_misses.clone()),
            Box::new(reloads.clone()),
        ] {
            registry
                .register(collector)
                .map_err(|e| SchemaError::Config(e.to_string()))?;
        }

        Ok(Self {
            registry,
            samples,
            cache_hits,
            cache_misses,
            reloads,
        })
    }

    pub fn record_decision(&self, decision: &Decision) {
        match decision {
            Decision::Accepted => {
                self.samples.with_label_values(&["accepted", ""]).inc();
            }
            Decision::Rejected { reason } => {
                self.samples
                    .with_label_values(&["rejected", reason.as_label()])
                    .inc();
            }
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.inc();
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.inc();
    }

    pub fn record_reload(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.reloads.with_label_values(&[outcome]).inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> SchemaResult<String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| SchemaError::Config(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| SchemaError::Serialization(e.to_string()))
    }
}
