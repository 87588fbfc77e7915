use super::{MetricFamily, MetricKind, RegistryError};
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

/// Content type of the text exposition format, version 0.0.4
pub const TEXT_CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Encode families in the Prometheus text exposition format.
///
/// A throwaway registry is filled per call, so series for vessels that left
/// the fleet disappear instead of lingering with their last value.
pub fn encode_text(families: &[MetricFamily]) -> Result<String, RegistryError> {
    let registry = Registry::new();

    for family in families {
        let opts = Opts::new(family.name, family.help);
        match family.kind {
            MetricKind::Gauge => {
                let vec = GaugeVec::new(opts, &family.label_names)?;
                registry.register(Box::new(vec.clone()))?;
                for sample in &family.samples {
                    let values: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
                    vec.get_metric_with_label_values(&values)?.set(sample.value);
                }
            }
            MetricKind::Counter => {
                let vec = CounterVec::new(opts, &family.label_names)?;
                registry.register(Box::new(vec.clone()))?;
                for sample in &family.samples {
                    let values: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
                    vec.get_metric_with_label_values(&values)?
                        .inc_by(sample.value.max(0.0));
                }
            }
        }
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| RegistryError::Encode(e.to_string()))
}
