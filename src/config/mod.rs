pub mod env;
pub mod validation;

pub use validation::{validate, ConfigError, MAX_VESSEL_COUNT};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Re-export per-component config types
pub use crate::api::ServerConfig;
pub use crate::fleet::{BoundingBox, FleetConfig, IdScheme, TypeWeights};
pub use crate::metrics::{RegistryConfig, VesselLabel};
pub use crate::sim::{AnomalyConfig, AnomalyToggle, SimulationConfig, TransitionConfig};

/// Environment variable naming the config file
pub const CONFIG_PATH_VAR: &str = "MARITIME_EXPORTER_CONFIG";

/// Complete exporter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub anomalies: AnomalyConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directive used when RUST_LOG is unset.
    pub fn filter_directive(&self) -> String {
        let level = self.level.to_ascii_lowercase();
        format!("maritime_exporter={},tower_http={}", level, level)
    }
}

impl ExporterConfig {
    /// Load from an optional TOML file, apply environment overrides, validate.
    pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        env::apply_overrides(&mut config, lookup)?;
        validate(&config)?;
        Ok(config)
    }

    /// Load using the process environment. The file path comes from the
    /// first CLI argument, else `MARITIME_EXPORTER_CONFIG`, else none.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = config_path(std::env::args().nth(1), |var| std::env::var(var).ok());
        Self::load(path.as_deref(), |var| std::env::var(var).ok())
    }

    /// Parse a TOML file. Missing sections and keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: display.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: display,
            message: e.to_string(),
        })
    }
}

/// Resolve the config file path from a CLI argument or the environment.
pub fn config_path<F>(cli_arg: Option<String>, lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    cli_arg
        .or_else(|| lookup(CONFIG_PATH_VAR))
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}
