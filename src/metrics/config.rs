use serde::{Deserialize, Serialize};

use crate::vessel::Vessel;

/// Metrics registry settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Descriptive labels added to every per-vessel series, in this order
    pub extra_labels: Vec<VesselLabel>,

    /// Upper bound on exposed series; exceeding it is rejected at startup
    pub max_series: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            extra_labels: Vec::new(),
            max_series: 10_000,
        }
    }
}

/// Optional per-vessel label
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VesselLabel {
    Name,
    Flag,
    Operator,
}

impl VesselLabel {
    /// Label name as exposed. `name` is prefixed to avoid reading as the
    /// metric name.
    pub fn label_name(&self) -> &'static str {
        match self {
            VesselLabel::Name => "vessel_name",
            VesselLabel::Flag => "flag",
            VesselLabel::Operator => "operator",
        }
    }

    pub fn value<'a>(&self, vessel: &'a Vessel) -> &'a str {
        match self {
            VesselLabel::Name => &vessel.name,
            VesselLabel::Flag => &vessel.flag,
            VesselLabel::Operator => &vessel.operator,
        }
    }
}
