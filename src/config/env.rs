use super::{ConfigError, ExporterConfig};
use crate::fleet::BoundingBox;
use std::str::FromStr;

/// Apply `MARITIME_*` overrides on top of file values.
///
/// `lookup` is `std::env::var` in production and a map in tests. Each
/// variable is independent; a set but unparsable value is an error rather
/// than silently ignored.
pub fn apply_overrides<F>(config: &mut ExporterConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(n) = parsed(&lookup, "MARITIME_VESSEL_COUNT")? {
        config.fleet.vessel_count = n;
    }
    if let Some(n) = parsed(&lookup, "MARITIME_TICK_INTERVAL_SECS")? {
        config.simulation.tick_interval_secs = n;
    }
    if let Some(n) = parsed(&lookup, "MARITIME_TICK_DURATION_SECS")? {
        config.simulation.tick_duration_secs = n;
    }
    if let Some(n) = parsed(&lookup, "MARITIME_SEED")? {
        config.fleet.seed = n;
    }
    if let Some(v) = lookup("MARITIME_BOUNDS") {
        config.fleet.bounds = BoundingBox::parse(&v).ok_or(ConfigError::InvalidEnv {
            var: "MARITIME_BOUNDS",
            value: v,
        })?;
    }
    if let Some(n) = parsed(&lookup, "MARITIME_PORT")? {
        config.server.port = n;
    }
    if let Some(v) = lookup("MARITIME_LOG_LEVEL") {
        config.log.level = v;
    }
    if let Some(v) = lookup("MARITIME_ADMIN_TOKEN") {
        // Empty string clears a token set in the file
        config.server.admin_token = if v.is_empty() { None } else { Some(v) };
    }

    Ok(())
}

fn parsed<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
