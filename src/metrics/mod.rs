// Metric families derived from fleet snapshots, and their text exposition

pub mod config;
mod encode;
mod registry;

pub use config::{RegistryConfig, VesselLabel};
pub use encode::{encode_text, TEXT_CONTENT_TYPE};
pub use registry::{MetricsRegistry, AGGREGATE_SERIES, PER_VESSEL_FAMILIES, PORT_SERIES};

use std::fmt;


/// Prometheus metric type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// One series: label values (in the family's `label_names` order), a value,
/// and the publish time of the snapshot it was read from
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSample {
    pub labels: Vec<String>,
    pub value: f64,
    /// Unix time in milliseconds
    pub timestamp_ms: i64,
}

/// A named metric with its help text and every series it currently has
#[derive(Clone, Debug, PartialEq)]
pub struct MetricFamily {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub label_names: Vec<&'static str>,
    pub samples: Vec<MetricSample>,
    timestamp_ms: i64,
}

impl MetricFamily {
    fn new(
        name: &'static str,
        help: &'static str,
        kind: MetricKind,
        label_names: Vec<&'static str>,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            name,
            help,
            kind,
            label_names,
            samples: Vec::new(),
            timestamp_ms,
        }
    }

    fn push(&mut self, labels: Vec<String>, value: f64) {
        self.samples.push(MetricSample {
            labels,
            value,
            timestamp_ms: self.timestamp_ms,
        });
    }

    /// First sample whose `label` equals `value`.
    pub fn find(&self, label: &str, value: &str) -> Option<&MetricSample> {
        let idx = self.label_names.iter().position(|n| *n == label)?;
        self.samples.iter().find(|s| s.labels[idx] == value)
    }
}

/// Registry errors
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// No snapshot has been published yet
    NotReady,
    Encode(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NotReady => write!(f, "no fleet snapshot published yet"),
            RegistryError::Encode(msg) => write!(f, "failed to encode metrics: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<prometheus::Error> for RegistryError {
    fn from(e: prometheus::Error) -> Self {
        RegistryError::Encode(e.to_string())
    }
}
