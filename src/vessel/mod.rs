use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speed limit applied by the compliance score (knots)
pub const SPEED_LIMIT_KNOTS: f64 = 20.0;

/// AIS signal quality never degrades below this (percent)
pub const MIN_AIS_QUALITY: f64 = 60.0;

const KM_PER_NM: f64 = 1.852;

#[cfg(test)]
mod tests;

/// Vessel category. Determines the speed envelope and the fleet mix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VesselType {
    Cargo,
    Tanker,
    Fishing,
    Passenger,
    Other,
}

impl VesselType {
    pub const ALL: [VesselType; 5] = [
        VesselType::Cargo,
        VesselType::Tanker,
        VesselType::Fishing,
        VesselType::Passenger,
        VesselType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VesselType::Cargo => "cargo",
            VesselType::Tanker => "tanker",
            VesselType::Fishing => "fishing",
            VesselType::Passenger => "passenger",
            VesselType::Other => "other",
        }
    }

    /// Hard upper bound on speed over ground (knots).
    pub fn max_speed(&self) -> f64 {
        match self {
            VesselType::Cargo => 25.0,
            VesselType::Tanker => 16.0,
            VesselType::Fishing => 12.0,
            VesselType::Passenger => 30.0,
            VesselType::Other => 20.0,
        }
    }

    /// Lower end of the normal cruising range (knots).
    pub fn cruise_speed(&self) -> f64 {
        match self {
            VesselType::Cargo => 12.0,
            VesselType::Tanker => 10.0,
            VesselType::Fishing => 4.0,
            VesselType::Passenger => 15.0,
            VesselType::Other => 6.0,
        }
    }

    /// Daily charter revenue range at full employment (USD).
    pub fn charter_rate_range(&self) -> (f64, f64) {
        match self {
            VesselType::Cargo => (80_000.0, 150_000.0),
            VesselType::Tanker => (60_000.0, 120_000.0),
            VesselType::Fishing => (5_000.0, 20_000.0),
            VesselType::Passenger => (50_000.0, 150_000.0),
            VesselType::Other => (20_000.0, 50_000.0),
        }
    }
}

impl fmt::Display for VesselType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigational status. `Decommissioned` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VesselStatus {
    Underway,
    Anchored,
    Moored,
    Adrift,
    Decommissioned,
}

impl VesselStatus {
    pub const ALL: [VesselStatus; 5] = [
        VesselStatus::Underway,
        VesselStatus::Anchored,
        VesselStatus::Moored,
        VesselStatus::Adrift,
        VesselStatus::Decommissioned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VesselStatus::Underway => "underway",
            VesselStatus::Anchored => "anchored",
            VesselStatus::Moored => "moored",
            VesselStatus::Adrift => "adrift",
            VesselStatus::Decommissioned => "decommissioned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VesselStatus::Decommissioned)
    }

    /// Numeric encoding exported as `vessel_status_code`.
    pub fn code(&self) -> f64 {
        match self {
            VesselStatus::Underway => 0.0,
            VesselStatus::Anchored => 1.0,
            VesselStatus::Moored => 2.0,
            VesselStatus::Adrift => 3.0,
            VesselStatus::Decommissioned => 4.0,
        }
    }

    /// Share of the charter rate earned in this status.
    pub fn revenue_factor(&self) -> f64 {
        match self {
            VesselStatus::Underway => 1.0,
            VesselStatus::Moored => 0.8,
            VesselStatus::Anchored => 0.3,
            VesselStatus::Adrift | VesselStatus::Decommissioned => 0.0,
        }
    }
}

impl fmt::Display for VesselStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthetic anomaly injected by the simulation engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    SuddenStop,
    SpeedSpike,
    PositionJump,
}

impl AnomalyKind {
    pub const ALL: [AnomalyKind; 3] = [
        AnomalyKind::SuddenStop,
        AnomalyKind::SpeedSpike,
        AnomalyKind::PositionJump,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::SuddenStop => "sudden_stop",
            AnomalyKind::SpeedSpike => "speed_spike",
            AnomalyKind::PositionJump => "position_jump",
        }
    }
}

/// Cumulative anomaly counts, one counter per kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyCounts {
    pub sudden_stop: u64,
    pub speed_spike: u64,
    pub position_jump: u64,
}

impl AnomalyCounts {
    pub fn record(&mut self, kind: AnomalyKind) {
        match kind {
            AnomalyKind::SuddenStop => self.sudden_stop += 1,
            AnomalyKind::SpeedSpike => self.speed_spike += 1,
            AnomalyKind::PositionJump => self.position_jump += 1,
        }
    }

    pub fn get(&self, kind: AnomalyKind) -> u64 {
        match kind {
            AnomalyKind::SuddenStop => self.sudden_stop,
            AnomalyKind::SpeedSpike => self.speed_spike,
            AnomalyKind::PositionJump => self.position_jump,
        }
    }

    pub fn total(&self) -> u64 {
        self.sudden_stop + self.speed_spike + self.position_jump
    }
}

/// Geographic position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// When a vessel was last advanced.
///
/// `tick` and `sim_elapsed_secs` form the monotonic half (simulated time never
/// goes backwards); `wall` records the UTC time of the tick that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateStamp {
    pub tick: u64,
    pub sim_elapsed_secs: f64,
    pub wall: DateTime<Utc>,
}

impl UpdateStamp {
    pub fn initial(wall: DateTime<Utc>) -> Self {
        Self {
            tick: 0,
            sim_elapsed_secs: 0.0,
            wall,
        }
    }
}

/// A simulated vessel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    /// Stable identifier, used as the `vessel_id` label
    pub id: String,

    /// Display name (e.g. "Pacific Voyager")
    pub name: String,

    pub vessel_type: VesselType,

    /// Flag state (ISO 3166 alpha-2)
    pub flag: String,

    pub operator: String,

    pub position: Position,

    /// Course over ground, degrees in [0, 360)
    pub heading: f64,

    /// Speed over ground, knots
    pub speed: f64,

    /// This hull's top speed; never above `vessel_type.max_speed()`
    pub max_speed: f64,

    pub status: VesselStatus,

    /// Fuel remaining, percent of capacity
    pub fuel_level: f64,

    /// Nominal fuel burn (metric tons per day)
    pub nominal_fuel_burn_mt: f64,

    /// Fuel burn reported for the latest tick (metric tons per day)
    pub fuel_consumption_mt_per_day: f64,

    /// Daily revenue at full employment (USD)
    pub charter_rate_usd: f64,

    /// AIS signal quality, percent in [MIN_AIS_QUALITY, 100]
    pub ais_signal_quality: f64,

    /// Open compliance findings
    pub compliance_violations: u32,

    pub anomalies: AnomalyCounts,

    pub last_update: UpdateStamp,
}

impl Vessel {
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// True when every field sits inside its documented range.
    pub fn within_invariants(&self) -> bool {
        self.position.is_valid()
            && (0.0..360.0).contains(&self.heading)
            && (0.0..=self.vessel_type.max_speed()).contains(&self.speed)
            && (0.0..=100.0).contains(&self.fuel_level)
            && self.fuel_consumption_mt_per_day >= 0.0
            && (MIN_AIS_QUALITY..=100.0).contains(&self.ais_signal_quality)
    }

    /// Distance covered per metric ton of fuel at the current speed.
    pub fn fuel_efficiency_km_per_mt(&self) -> f64 {
        if self.fuel_consumption_mt_per_day > 0.0 {
            self.speed * 24.0 * KM_PER_NM / self.fuel_consumption_mt_per_day
        } else {
            0.0
        }
    }

    pub fn revenue_per_day_usd(&self) -> f64 {
        self.charter_rate_usd * self.status.revenue_factor()
    }

    pub fn exceeds_speed_limit(&self) -> bool {
        self.speed > SPEED_LIMIT_KNOTS
    }

    /// Mean of the speed, AIS and inspection-record components, 0 to 100.
    pub fn compliance_score(&self) -> f64 {
        let speed = if self.exceeds_speed_limit() { 70.0 } else { 100.0 };
        let record = if self.compliance_violations == 0 {
            90.0
        } else {
            (90.0 - 10.0 * self.compliance_violations as f64).max(60.0)
        };
        (speed + self.ais_signal_quality + record) / 3.0
    }
}
