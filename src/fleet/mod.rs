// Fleet aggregate: generation, lookup, decommissioning

pub mod config;

pub use config::{BoundingBox, FleetConfig, IdScheme, TypeWeights};

use crate::vessel::{AnomalyCounts, Position, UpdateStamp, Vessel, VesselStatus, VesselType};
use chrono::{DateTime, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;


const NAME_PREFIXES: [&str; 8] = [
    "Star", "Ocean", "Global", "Pacific", "Atlantic", "Northern", "Eastern", "Western",
];
const NAME_SUFFIXES: [&str; 8] = [
    "Trader", "Pioneer", "Voyager", "Navigator", "Explorer", "Leader", "Champion", "Victory",
];
const FLAGS: [&str; 13] = [
    "MH", "LR", "PA", "SG", "MT", "CY", "GB", "NO", "DK", "NL", "CN", "KR", "JP",
];
const OPERATORS: [&str; 10] = [
    "Maersk", "MSC", "COSCO", "CMA CGM", "Hapag-Lloyd", "ONE", "Yang Ming", "Evergreen", "PIL",
    "Zim",
];

// Initial status mix in percent: 70 underway, 15 anchored, rest moored
const INITIAL_UNDERWAY_PCT: u32 = 70;
const INITIAL_ANCHORED_PCT: u32 = 15;

/// Fleet errors
#[derive(Debug, Clone, PartialEq)]
pub enum FleetError {
    UnknownVessel(String),
    AlreadyDecommissioned(String),
    DuplicateId(String),
    InvalidTypeWeights,
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FleetError::UnknownVessel(id) => write!(f, "unknown vessel '{}'", id),
            FleetError::AlreadyDecommissioned(id) => {
                write!(f, "vessel '{}' is already decommissioned", id)
            }
            FleetError::DuplicateId(id) => write!(f, "duplicate vessel id '{}'", id),
            FleetError::InvalidTypeWeights => {
                write!(f, "vessel type weights must be non-negative with a positive sum")
            }
        }
    }
}

impl std::error::Error for FleetError {}

/// The set of simulated vessels, unique by id and kept in id order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fleet {
    vessels: Vec<Vessel>,
}

impl Fleet {
    /// Build a fleet from explicit vessels. Rejects duplicate ids.
    pub fn from_vessels(mut vessels: Vec<Vessel>) -> Result<Self, FleetError> {
        let mut seen = HashSet::with_capacity(vessels.len());
        for vessel in &vessels {
            if !seen.insert(vessel.id.as_str()) {
                return Err(FleetError::DuplicateId(vessel.id.clone()));
            }
        }
        vessels.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(Self { vessels })
    }

    /// Generate `config.vessel_count` vessels with randomized positions (uniform
    /// within the bounding box), weighted types and type-appropriate speeds.
    pub fn generate<R: Rng + ?Sized>(
        config: &FleetConfig,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Self, FleetError> {
        let type_index = WeightedIndex::new(config.type_weights.as_array())
            .map_err(|_| FleetError::InvalidTypeWeights)?;

        let mut vessels = Vec::with_capacity(config.vessel_count);
        for i in 0..config.vessel_count {
            let vessel_type = VesselType::ALL[type_index.sample(rng)];
            let max_speed =
                rng.gen_range(vessel_type.cruise_speed()..=vessel_type.max_speed());

            let status = initial_status(rng.gen_range(0..100));
            let speed = match status {
                VesselStatus::Underway => {
                    rng.gen_range(vessel_type.cruise_speed() * 0.8..=max_speed)
                }
                VesselStatus::Anchored => rng.gen_range(0.0..=0.5),
                _ => 0.0,
            };

            let heading = rng.gen_range(0.0..360.0);
            let bounds = &config.bounds;
            let position = Position::new(
                rng.gen_range(bounds.min_lat..=bounds.max_lat),
                rng.gen_range(bounds.min_lon..=bounds.max_lon),
            );

            let name = format!(
                "{} {}",
                NAME_PREFIXES[rng.gen_range(0..NAME_PREFIXES.len())],
                NAME_SUFFIXES[rng.gen_range(0..NAME_SUFFIXES.len())]
            );
            let flag = FLAGS[rng.gen_range(0..FLAGS.len())].to_string();
            let operator = OPERATORS[rng.gen_range(0..OPERATORS.len())].to_string();
            let fuel_level = rng.gen_range(30.0..=95.0);
            let nominal_fuel_burn_mt = rng.gen_range(50.0..=300.0);
            let (min_rate, max_rate) = vessel_type.charter_rate_range();
            let charter_rate_usd = rng.gen_range(min_rate..=max_rate);
            let ais_signal_quality = rng.gen_range(85.0..=100.0);
            let compliance_violations = rng.gen_range(0..=3);

            let id = match config.id_scheme {
                IdScheme::Seeded => uuid::Builder::from_random_bytes(rng.gen())
                    .into_uuid()
                    .to_string(),
                IdScheme::Sequential => format!("V{:04}", i + 1),
                IdScheme::Random => Uuid::new_v4().to_string(),
            };

            vessels.push(Vessel {
                id,
                name,
                vessel_type,
                flag,
                operator,
                position,
                heading,
                speed,
                max_speed,
                status,
                fuel_level,
                nominal_fuel_burn_mt,
                fuel_consumption_mt_per_day: nominal_fuel_burn_mt,
                charter_rate_usd,
                ais_signal_quality,
                compliance_violations,
                anomalies: AnomalyCounts::default(),
                last_update: UpdateStamp::initial(now),
            });
        }

        Self::from_vessels(vessels)
    }

    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Vessel> {
        self.index_of(id).map(|i| &self.vessels[i])
    }

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    /// Mutable access for the simulation engine. Ids must not be changed.
    pub(crate) fn vessels_mut(&mut self) -> &mut [Vessel] {
        &mut self.vessels
    }

    /// Move a vessel into the terminal state. It stops and is skipped by
    /// every later tick.
    pub fn decommission(&mut self, id: &str, stamp: UpdateStamp) -> Result<(), FleetError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| FleetError::UnknownVessel(id.to_string()))?;
        let vessel = &mut self.vessels[index];

        if vessel.status.is_terminal() {
            return Err(FleetError::AlreadyDecommissioned(id.to_string()));
        }

        vessel.status = VesselStatus::Decommissioned;
        vessel.speed = 0.0;
        vessel.last_update = stamp;
        Ok(())
    }

    /// Remove all decommissioned vessels. Returns how many were removed.
    pub fn prune_decommissioned(&mut self) -> usize {
        let before = self.vessels.len();
        self.vessels.retain(|v| v.is_active());
        before - self.vessels.len()
    }

    pub fn has_decommissioned(&self) -> bool {
        self.vessels.iter().any(|v| !v.is_active())
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.vessels
            .binary_search_by(|v| v.id.as_str().cmp(id))
            .ok()
    }
}

fn initial_status(roll: u32) -> VesselStatus {
    if roll < INITIAL_UNDERWAY_PCT {
        VesselStatus::Underway
    } else if roll < INITIAL_UNDERWAY_PCT + INITIAL_ANCHORED_PCT {
        VesselStatus::Anchored
    } else {
        VesselStatus::Moored
    }
}
