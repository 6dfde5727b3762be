//! Ingest validation gateway
//!
//! Public entry point for the ingest pipeline: validates one incoming
//! metric sample against the resolved descriptor before acceptance.
//! Rejection is a per-sample outcome, not an error - the pipeline decides
//! whether to drop, quarantine, or log. Only registry-level failures
//! (unknown version, malformed replacement document) propagate as errors.
//!
//! Validation rules:
//! - `metadata` descriptors accept only text payloads
//! - all other types accept only finite numbers; NaN and infinities are
//!   rejected since they indicate counter wraparound or instrumentation
//!   bugs upstream, not legitimate data

use crate::error::SchemaResult;
use crate::registry::SchemaRegistry;
use crate::resolver;
use crate::types::{MetricType, SchemaKind};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "metrics")]
use crate::metrics::SchemaMetrics;

/// One incoming sample value
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Number(f64),
    Text(String),
}

impl From<f64> for SampleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SampleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SampleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Why a sample was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No descriptor matches the metric path - a normal condition for
    /// sparsely instrumented hosts
    UnknownMetric,
    /// The sample value is malformed relative to the descriptor type
    InvalidValue(String),
}

impl RejectReason {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::UnknownMetric => "unknown_metric",
            Self::InvalidValue(_) => "invalid_value",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMetric => write!(f, "unknown metric"),
            Self::InvalidValue(detail) => write!(f, "invalid value: {}", detail),
        }
    }
}

/// Outcome of validating one sample
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Accepted,
    Rejected { reason: RejectReason },
}

impl Decision {
    fn rejected(reason: RejectReason) -> Self {
        Self::Rejected { reason }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Validation entry point used by the ingest pipeline
pub struct ValidationGateway {
    registry: Arc<SchemaRegistry>,
    #[cfg(feature = "metrics")]
    metrics: Option<Arc<SchemaMetrics>>,
}

impl ValidationGateway {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
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

    /// Validate one sample against the schema for `(kind, version)`
    ///
    /// Fails only on registry errors (e.g. unknown version); per-sample
    /// problems come back as [`Decision::Rejected`].
    pub async fn validate(
        &self,
        kind: SchemaKind,
        version: &str,
        metric_path: &str,
        sample: &SampleValue,
    ) -> SchemaResult<Decision> {
        let document = self.registry.get(kind, version).await?;

        let decision = match resolver::resolve(&document, metric_path).first() {
            None => {
                debug!(metric = metric_path, version, "sample for uninstrumented metric");
                Decision::rejected(RejectReason::UnknownMetric)
            }
            Some(descriptor) => check_value(descriptor.value_type, sample),
        };

        #[cfg(feature = "metrics")]
        if let Some(ref metrics) = self.metrics {
            metrics.record_decision(&decision);
        }
        Ok(decision)
    }
}

fn check_value(value_type: MetricType, sample: &SampleValue) -> Decision {
    match (value_type, sample) {
        (MetricType::Metadata, SampleValue::Text(_)) => Decision::Accepted,
        (MetricType::Metadata, SampleValue::Number(_)) => Decision::rejected(
            RejectReason::InvalidValue("metadata metric expects a text payload".to_string()),
        ),
        (_, SampleValue::Number(n)) if n.is_finite() => Decision::Accepted,
        (_, SampleValue::Number(n)) => Decision::rejected(RejectReason::InvalidValue(format!(
            "non-finite sample value {}",
            n
        ))),
        (_, SampleValue::Text(_)) => Decision::rejected(RejectReason::InvalidValue(
            "numeric metric expects a finite number, got text".to_string(),
        )),
    }
}
