use super::ExporterConfig;
use crate::api::{READY_PATH, VESSELS_PATH};
use crate::metrics::MetricsRegistry;
use crate::vessel::VesselType;
use std::collections::HashSet;
use std::fmt;

/// Largest fleet accepted at startup
pub const MAX_VESSEL_COUNT: usize = 100_000;

/// Largest per-tick heading perturbation (degrees, either direction)
pub const MAX_HEADING_DELTA_DEG: f64 = 180.0;

/// Log levels accepted by `log.level`
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Configuration errors. All are fatal at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io { path: String, message: String },
    Parse { path: String, message: String },
    InvalidEnv { var: &'static str, value: String },
    VesselCount(usize),
    InvalidPort,
    InvalidBounds(String),
    NonPositive { field: &'static str, value: f64 },
    Negative { field: &'static str, value: f64 },
    TooLarge { field: &'static str, value: f64, max: f64 },
    Probability { field: &'static str, value: f64 },
    OutgoingProbability { status: &'static str, sum: f64 },
    InvalidTypeWeights,
    InvalidPath { field: &'static str, value: String },
    PathConflict(String),
    InvalidLogLevel(String),
    DuplicateLabel(String),
    TooManySeries { expected: usize, max: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "cannot read config file '{}': {}", path, message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "invalid config file '{}': {}", path, message)
            }
            ConfigError::InvalidEnv { var, value } => {
                write!(f, "invalid value '{}' for {}", value, var)
            }
            ConfigError::VesselCount(n) => write!(
                f,
                "fleet.vessel_count must be between 1 and {}, got {}",
                MAX_VESSEL_COUNT, n
            ),
            ConfigError::InvalidPort => write!(f, "server.port must not be 0"),
            ConfigError::InvalidBounds(reason) => write!(f, "invalid fleet.bounds: {}", reason),
            ConfigError::NonPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            ConfigError::Negative { field, value } => {
                write!(f, "{} must not be negative, got {}", field, value)
            }
            ConfigError::TooLarge { field, value, max } => {
                write!(f, "{} must be at most {}, got {}", field, max, value)
            }
            ConfigError::Probability { field, value } => {
                write!(f, "{} must be a probability in [0, 1], got {}", field, value)
            }
            ConfigError::OutgoingProbability { status, sum } => write!(
                f,
                "transition probabilities out of {} sum to {}, must not exceed 1",
                status, sum
            ),
            ConfigError::InvalidTypeWeights => write!(
                f,
                "fleet.type_weights must be finite, non-negative and not all zero"
            ),
            ConfigError::InvalidPath { field, value } => write!(
                f,
                "{} must start with '/' and contain no ':' or '*', got '{}'",
                field, value
            ),
            ConfigError::PathConflict(path) => {
                write!(f, "path '{}' is already served by another endpoint", path)
            }
            ConfigError::InvalidLogLevel(level) => write!(
                f,
                "unknown log.level '{}', expected one of {}",
                level,
                LOG_LEVELS.join(", ")
            ),
            ConfigError::DuplicateLabel(label) => {
                write!(f, "registry.extra_labels lists '{}' more than once", label)
            }
            ConfigError::TooManySeries { expected, max } => write!(
                f,
                "fleet would expose {} series, above registry.max_series ({})",
                expected, max
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Check every cross-field and range rule. Returns the first violation.
pub fn validate(config: &ExporterConfig) -> Result<(), ConfigError> {
    validate_fleet(config)?;
    validate_simulation(config)?;
    validate_anomalies(config)?;
    validate_registry(config)?;
    validate_server(config)?;

    let level = config.log.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::InvalidLogLevel(config.log.level.clone()));
    }

    Ok(())
}

fn validate_fleet(config: &ExporterConfig) -> Result<(), ConfigError> {
    let fleet = &config.fleet;

    if fleet.vessel_count == 0 || fleet.vessel_count > MAX_VESSEL_COUNT {
        return Err(ConfigError::VesselCount(fleet.vessel_count));
    }

    let b = &fleet.bounds;
    if !b.is_well_formed() {
        return Err(ConfigError::InvalidBounds(format!(
            "({}, {}) to ({}, {}) must be finite, on the globe and ordered min <= max",
            b.min_lat, b.min_lon, b.max_lat, b.max_lon
        )));
    }

    let weights = fleet.type_weights.as_array();
    let valid = weights.iter().all(|w| w.is_finite() && *w >= 0.0)
        && weights.iter().sum::<f64>() > 0.0;
    if !valid {
        return Err(ConfigError::InvalidTypeWeights);
    }

    Ok(())
}

fn validate_simulation(config: &ExporterConfig) -> Result<(), ConfigError> {
    let sim = &config.simulation;

    if sim.tick_interval_secs == 0 {
        return Err(ConfigError::NonPositive {
            field: "simulation.tick_interval_secs",
            value: 0.0,
        });
    }
    if !(sim.tick_duration_secs.is_finite() && sim.tick_duration_secs > 0.0) {
        return Err(ConfigError::NonPositive {
            field: "simulation.tick_duration_secs",
            value: sim.tick_duration_secs,
        });
    }
    non_negative("simulation.heading_delta_deg", sim.heading_delta_deg)?;
    at_most(
        "simulation.heading_delta_deg",
        sim.heading_delta_deg,
        MAX_HEADING_DELTA_DEG,
    )?;
    non_negative("simulation.speed_delta_knots", sim.speed_delta_knots)?;
    at_most(
        "simulation.speed_delta_knots",
        sim.speed_delta_knots,
        fastest_type_speed(),
    )?;

    for (field, value) in sim.transitions.named() {
        probability(field, value)?;
    }
    for (status, sum) in sim.transitions.outgoing() {
        if sum > 1.0 {
            return Err(ConfigError::OutgoingProbability { status, sum });
        }
    }

    Ok(())
}

fn validate_anomalies(config: &ExporterConfig) -> Result<(), ConfigError> {
    let anomalies = &config.anomalies;

    non_negative("anomalies.position_jump_nm", anomalies.position_jump_nm)?;
    probability(
        "anomalies.sudden_stop.probability",
        anomalies.sudden_stop.probability,
    )?;
    probability(
        "anomalies.speed_spike.probability",
        anomalies.speed_spike.probability,
    )?;
    probability(
        "anomalies.position_jump.probability",
        anomalies.position_jump.probability,
    )?;

    Ok(())
}

fn validate_registry(config: &ExporterConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for label in &config.registry.extra_labels {
        if !seen.insert(label) {
            return Err(ConfigError::DuplicateLabel(label.label_name().to_string()));
        }
    }

    let expected = MetricsRegistry::expected_series(config.fleet.vessel_count);
    if expected > config.registry.max_series {
        return Err(ConfigError::TooManySeries {
            expected,
            max: config.registry.max_series,
        });
    }

    Ok(())
}

fn validate_server(config: &ExporterConfig) -> Result<(), ConfigError> {
    let server = &config.server;

    if server.port == 0 {
        return Err(ConfigError::InvalidPort);
    }
    if server.request_timeout_ms == 0 {
        return Err(ConfigError::NonPositive {
            field: "server.request_timeout_ms",
            value: 0.0,
        });
    }
    for (field, value) in [
        ("server.metrics_path", &server.metrics_path),
        ("server.health_path", &server.health_path),
    ] {
        // ':' and '*' would turn the path into a route pattern
        if !value.starts_with('/') || value.contains(|c: char| c == ':' || c == '*') {
            return Err(ConfigError::InvalidPath {
                field,
                value: value.clone(),
            });
        }
        if value.as_str() == READY_PATH || is_under(value, VESSELS_PATH) {
            return Err(ConfigError::PathConflict(value.clone()));
        }
    }
    if server.metrics_path == server.health_path {
        return Err(ConfigError::PathConflict(server.metrics_path.clone()));
    }

    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn at_most(field: &'static str, value: f64, max: f64) -> Result<(), ConfigError> {
    if value <= max {
        Ok(())
    } else {
        Err(ConfigError::TooLarge { field, value, max })
    }
}

fn fastest_type_speed() -> f64 {
    VesselType::ALL
        .iter()
        .map(|t| t.max_speed())
        .fold(0.0, f64::max)
}

/// True when `path` is `prefix` itself or a path below it.
fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { field, value })
    }
}
