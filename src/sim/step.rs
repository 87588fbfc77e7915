// One tick of motion, drift, status change and anomalies for a single vessel

use super::config::{AnomalyConfig, SimulationConfig, TransitionConfig};
use super::kinematics::{destination, distance_nm, normalize_heading, wrap_longitude};
use crate::vessel::{AnomalyKind, Vessel, VesselStatus, MIN_AIS_QUALITY};
use rand::Rng;
use std::fmt;

/// Speed ceiling while swinging at anchor (knots)
const ANCHORED_MAX_SPEED: f64 = 0.5;
/// Speed ceiling while drifting without propulsion (knots)
const ADRIFT_MAX_SPEED: f64 = 2.0;
/// Adrift vessels yaw this many times more than steered ones
const ADRIFT_HEADING_FACTOR: f64 = 3.0;

/// Fuel burn, percent of capacity per simulated hour
const FUEL_BASE_BURN: f64 = 0.012;
const FUEL_LOAD_BURN: f64 = 0.12;
/// Bunkering rate while moored, percent per simulated hour
const FUEL_REFILL: f64 = 5.0;

/// Day-to-day variation of reported fuel burn around the nominal rate
const FUEL_BURN_NOISE: f64 = 0.1;
/// AIS quality change per tick: degrades faster than it recovers
const AIS_DELTA_DOWN: f64 = 2.0;
const AIS_DELTA_UP: f64 = 1.0;

/// Below this a clamp is float noise, not worth a warning
const CLAMP_TOLERANCE: f64 = 1e-9;

/// Failure to advance one vessel. The caller keeps the previous state.
#[derive(Debug, Clone, PartialEq)]
pub enum StepError {
    NonFinite { field: &'static str, value: f64 },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::NonFinite { field, value } => {
                write!(f, "computed {} is not finite ({})", field, value)
            }
        }
    }
}

impl std::error::Error for StepError {}

/// Result of advancing one vessel
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub vessel: Vessel,

    /// Anomalies injected this tick, already counted on `vessel`
    pub anomalies: Vec<AnomalyKind>,

    /// Fields that had to be forced back into range
    pub clamped: Vec<&'static str>,
}

/// Advance `vessel` by one tick of `sim.tick_duration_secs`.
///
/// Pure with respect to `vessel`: the new state is returned, never written in
/// place, so a failure leaves the caller's copy untouched. The number of PRNG
/// draws does not depend on which anomalies are switched on.
pub fn step_vessel<R: Rng + ?Sized>(
    vessel: &Vessel,
    rng: &mut R,
    sim: &SimulationConfig,
    anomalies: &AnomalyConfig,
) -> Result<StepOutcome, StepError> {
    let mut next = vessel.clone();

    let status = next_status(next.status, rng, &sim.transitions);
    if status != next.status {
        enter_status(&mut next, status, rng);
    } else {
        drift(&mut next, rng, sim);
    }

    let fired = roll_anomalies(&mut next, rng, anomalies);

    if matches!(next.status, VesselStatus::Underway | VesselStatus::Adrift) && next.speed > 0.0
    {
        let distance = distance_nm(next.speed, sim.tick_duration_secs);
        next.position = destination(next.position, next.heading, distance);
    }

    update_fuel(&mut next, sim.tick_duration_secs);
    update_telemetry(&mut next, rng);

    let clamped = sanitize(&mut next)?;
    for kind in &fired {
        next.anomalies.record(*kind);
    }

    Ok(StepOutcome {
        vessel: next,
        anomalies: fired,
        clamped,
    })
}

/// Roll the status transition for this tick. Always one draw.
fn next_status<R: Rng + ?Sized>(
    status: VesselStatus,
    rng: &mut R,
    transitions: &TransitionConfig,
) -> VesselStatus {
    let roll: f64 = rng.gen();

    match status {
        VesselStatus::Underway => {
            let to_moored = transitions.underway_to_moored;
            let to_anchored = to_moored + transitions.underway_to_anchored;
            let to_adrift = to_anchored + transitions.underway_to_adrift;
            if roll < to_moored {
                VesselStatus::Moored
            } else if roll < to_anchored {
                VesselStatus::Anchored
            } else if roll < to_adrift {
                VesselStatus::Adrift
            } else {
                VesselStatus::Underway
            }
        }
        VesselStatus::Anchored => {
            let to_moored = transitions.anchored_to_moored;
            let to_underway = to_moored + transitions.anchored_to_underway;
            if roll < to_moored {
                VesselStatus::Moored
            } else if roll < to_underway {
                VesselStatus::Underway
            } else {
                VesselStatus::Anchored
            }
        }
        VesselStatus::Moored if roll < transitions.moored_to_underway => VesselStatus::Underway,
        VesselStatus::Adrift if roll < transitions.adrift_to_underway => VesselStatus::Underway,
        other => other,
    }
}

fn enter_status<R: Rng + ?Sized>(vessel: &mut Vessel, status: VesselStatus, rng: &mut R) {
    vessel.status = status;
    vessel.speed = match status {
        VesselStatus::Underway => {
            let low = vessel.vessel_type.cruise_speed().min(vessel.max_speed);
            rng.gen_range(low..=vessel.max_speed)
        }
        VesselStatus::Anchored => rng.gen_range(0.0..=ANCHORED_MAX_SPEED),
        VesselStatus::Adrift => rng.gen_range(0.0..=ADRIFT_MAX_SPEED.min(vessel.max_speed)),
        VesselStatus::Moored | VesselStatus::Decommissioned => 0.0,
    };
}

fn drift<R: Rng + ?Sized>(vessel: &mut Vessel, rng: &mut R, sim: &SimulationConfig) {
    let hd = sim.heading_delta_deg;
    let sd = sim.speed_delta_knots;

    match vessel.status {
        VesselStatus::Underway => {
            vessel.heading = normalize_heading(vessel.heading + rng.gen_range(-hd..=hd));
            vessel.speed = (vessel.speed + rng.gen_range(-sd..=sd)).clamp(0.0, vessel.max_speed);
        }
        VesselStatus::Anchored => {
            vessel.heading = normalize_heading(vessel.heading + rng.gen_range(-hd..=hd));
            vessel.speed = rng.gen_range(0.0..=ANCHORED_MAX_SPEED);
        }
        VesselStatus::Adrift => {
            let yaw = hd * ADRIFT_HEADING_FACTOR;
            vessel.heading = normalize_heading(vessel.heading + rng.gen_range(-yaw..=yaw));
            vessel.speed = rng.gen_range(0.0..=ADRIFT_MAX_SPEED.min(vessel.max_speed));
        }
        VesselStatus::Moored | VesselStatus::Decommissioned => {}
    }
}

/// Roll every anomaly kind. Only underway vessels are affected, but the
/// draws happen regardless so toggling one kind does not reshuffle the rest
/// of the run.
fn roll_anomalies<R: Rng + ?Sized>(
    vessel: &mut Vessel,
    rng: &mut R,
    config: &AnomalyConfig,
) -> Vec<AnomalyKind> {
    let mut fired = Vec::new();
    let jump_bearing: f64 = rng.gen_range(0.0..360.0);

    for kind in AnomalyKind::ALL {
        let roll: f64 = rng.gen();
        let toggle = config.toggle(kind);

        let applies = config.enabled
            && toggle.enabled
            && vessel.status == VesselStatus::Underway
            && roll < toggle.probability;
        if !applies {
            continue;
        }

        match kind {
            AnomalyKind::SuddenStop => vessel.speed = 0.0,
            AnomalyKind::SpeedSpike => vessel.speed = vessel.vessel_type.max_speed(),
            AnomalyKind::PositionJump => {
                vessel.position = destination(vessel.position, jump_bearing, config.position_jump_nm)
            }
        }
        fired.push(kind);
    }

    fired
}

fn update_fuel(vessel: &mut Vessel, tick_secs: f64) {
    let hours = tick_secs / 3600.0;

    match vessel.status {
        VesselStatus::Moored => vessel.fuel_level += FUEL_REFILL * hours,
        VesselStatus::Decommissioned => {}
        _ => {
            let load = if vessel.max_speed > 0.0 {
                vessel.speed / vessel.max_speed
            } else {
                0.0
            };
            vessel.fuel_level -= (FUEL_BASE_BURN + FUEL_LOAD_BURN * load) * hours;
        }
    }
    vessel.fuel_level = vessel.fuel_level.clamp(0.0, 100.0);
}

/// Fuel burn report and AIS reception. Always two draws.
fn update_telemetry<R: Rng + ?Sized>(vessel: &mut Vessel, rng: &mut R) {
    let noise: f64 = rng.gen_range(-FUEL_BURN_NOISE..=FUEL_BURN_NOISE);
    let ais_delta: f64 = rng.gen_range(-AIS_DELTA_DOWN..=AIS_DELTA_UP);

    vessel.fuel_consumption_mt_per_day = vessel.nominal_fuel_burn_mt * (1.0 + noise);
    vessel.ais_signal_quality += ais_delta;
}

/// Reject non-finite state, force finite state back into range. Returns the
/// names of fields that were off by more than float noise.
fn sanitize(vessel: &mut Vessel) -> Result<Vec<&'static str>, StepError> {
    let fields = [
        ("latitude", vessel.position.latitude),
        ("longitude", vessel.position.longitude),
        ("heading", vessel.heading),
        ("speed", vessel.speed),
        ("fuel_level", vessel.fuel_level),
        ("fuel_consumption", vessel.fuel_consumption_mt_per_day),
        ("ais_signal_quality", vessel.ais_signal_quality),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(StepError::NonFinite { field, value });
        }
    }

    let mut clamped = Vec::new();
    let mut fix = |field: &'static str, before: f64, after: f64| {
        if (before - after).abs() > CLAMP_TOLERANCE {
            clamped.push(field);
        }
        after
    };

    vessel.position.latitude = fix(
        "latitude",
        vessel.position.latitude,
        vessel.position.latitude.clamp(-90.0, 90.0),
    );
    vessel.position.longitude = fix(
        "longitude",
        vessel.position.longitude,
        wrap_longitude(vessel.position.longitude),
    );
    vessel.heading = fix("heading", vessel.heading, normalize_heading(vessel.heading));
    vessel.speed = fix(
        "speed",
        vessel.speed,
        vessel.speed.clamp(0.0, vessel.vessel_type.max_speed()),
    );
    vessel.fuel_level = fix(
        "fuel_level",
        vessel.fuel_level,
        vessel.fuel_level.clamp(0.0, 100.0),
    );
    vessel.fuel_consumption_mt_per_day = fix(
        "fuel_consumption",
        vessel.fuel_consumption_mt_per_day,
        vessel.fuel_consumption_mt_per_day.max(0.0),
    );
    // Reception drifts against its floor and ceiling every tick; not a fault
    vessel.ais_signal_quality = vessel.ais_signal_quality.clamp(MIN_AIS_QUALITY, 100.0);

    Ok(clamped)
}
