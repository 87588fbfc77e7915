use crate::vessel::AnomalyKind;
use serde::{Deserialize, Serialize};

/// Simulation timing and drift settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock seconds between ticks
    pub tick_interval_secs: u64,

    /// Simulated seconds covered by one tick
    pub tick_duration_secs: f64,

    /// Maximum heading change per tick (degrees, either direction)
    pub heading_delta_deg: f64,

    /// Maximum speed change per tick for underway vessels (knots)
    pub speed_delta_knots: f64,

    pub transitions: TransitionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 15,
            tick_duration_secs: 300.0,
            heading_delta_deg: 5.0,
            speed_delta_knots: 1.0,
            transitions: TransitionConfig::default(),
        }
    }
}

/// Per-tick status transition probabilities
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub underway_to_moored: f64,
    pub underway_to_anchored: f64,
    pub underway_to_adrift: f64,
    pub anchored_to_moored: f64,
    pub anchored_to_underway: f64,
    pub moored_to_underway: f64,
    pub adrift_to_underway: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            underway_to_moored: 0.01,
            underway_to_anchored: 0.01,
            underway_to_adrift: 0.002,
            anchored_to_moored: 0.10,
            anchored_to_underway: 0.02,
            moored_to_underway: 0.05,
            adrift_to_underway: 0.10,
        }
    }
}

impl TransitionConfig {
    /// Every probability, named, for validation.
    pub fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("underway_to_moored", self.underway_to_moored),
            ("underway_to_anchored", self.underway_to_anchored),
            ("underway_to_adrift", self.underway_to_adrift),
            ("anchored_to_moored", self.anchored_to_moored),
            ("anchored_to_underway", self.anchored_to_underway),
            ("moored_to_underway", self.moored_to_underway),
            ("adrift_to_underway", self.adrift_to_underway),
        ]
    }

    /// Summed outgoing probability per source status, for validation.
    pub fn outgoing(&self) -> [(&'static str, f64); 4] {
        [
            (
                "underway",
                self.underway_to_moored + self.underway_to_anchored + self.underway_to_adrift,
            ),
            (
                "anchored",
                self.anchored_to_moored + self.anchored_to_underway,
            ),
            ("moored", self.moored_to_underway),
            ("adrift", self.adrift_to_underway),
        ]
    }
}

/// Synthetic anomaly injection
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Master switch; when false no anomaly is ever rolled
    pub enabled: bool,

    /// Displacement of a position jump (nautical miles)
    pub position_jump_nm: f64,

    pub sudden_stop: AnomalyToggle,
    pub speed_spike: AnomalyToggle,
    pub position_jump: AnomalyToggle,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position_jump_nm: 60.0,
            sudden_stop: AnomalyToggle::new(0.005),
            speed_spike: AnomalyToggle::new(0.005),
            position_jump: AnomalyToggle::new(0.002),
        }
    }
}

impl AnomalyConfig {
    /// All anomalies off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn toggle(&self, kind: AnomalyKind) -> AnomalyToggle {
        match kind {
            AnomalyKind::SuddenStop => self.sudden_stop,
            AnomalyKind::SpeedSpike => self.speed_spike,
            AnomalyKind::PositionJump => self.position_jump,
        }
    }
}

/// One independently switchable anomaly
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyToggle {
    pub enabled: bool,

    /// Chance per underway vessel per tick
    pub probability: f64,
}

impl AnomalyToggle {
    pub fn new(probability: f64) -> Self {
        Self {
            enabled: true,
            probability,
        }
    }

    pub fn off() -> Self {
        Self {
            enabled: false,
            probability: 0.0,
        }
    }
}

impl Default for AnomalyToggle {
    // A table that only sets `probability` is switched on
    fn default() -> Self {
        Self::new(0.0)
    }
}
