use serde::{Deserialize, Serialize};

/// Fleet generation settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Number of vessels created at startup
    pub vessel_count: usize,

    /// Seed for the simulation PRNG. Same seed, same fleet, same trajectory.
    pub seed: u64,

    /// How vessel identifiers are minted
    pub id_scheme: IdScheme,

    /// Drop decommissioned vessels once a scrape has seen their terminal state
    pub prune_decommissioned: bool,

    /// Area initial positions are drawn from
    pub bounds: BoundingBox,

    /// Relative weights for the vessel type mix
    pub type_weights: TypeWeights,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            vessel_count: 50,
            seed: 42,
            id_scheme: IdScheme::Seeded,
            prune_decommissioned: true,
            bounds: BoundingBox::default(),
            type_weights: TypeWeights::default(),
        }
    }
}

/// Vessel identifier scheme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// UUID built from the seeded PRNG; stable across restarts
    Seeded,
    /// `V0001`, `V0002`, ...
    Sequential,
    /// UUIDv4 from the OS; changes on every restart
    Random,
}

impl IdScheme {
    /// Whether identifiers survive a restart with the same configuration.
    pub fn is_stable(&self) -> bool {
        !matches!(self, IdScheme::Random)
    }
}

/// Geographic bounding box in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Default for BoundingBox {
    // Navigable latitudes, all longitudes
    fn default() -> Self {
        Self {
            min_lat: -60.0,
            min_lon: -180.0,
            max_lat: 70.0,
            max_lon: 180.0,
        }
    }
}

impl BoundingBox {
    /// Parse `min_lat,min_lon,max_lat,max_lon`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;

        match parts.as_slice() {
            [min_lat, min_lon, max_lat, max_lon] => Some(Self {
                min_lat: *min_lat,
                min_lon: *min_lon,
                max_lat: *max_lat,
                max_lon: *max_lon,
            }),
            _ => None,
        }
    }

    /// Finite, inside the globe, and not inverted. A degenerate (point or
    /// line) box is accepted.
    pub fn is_well_formed(&self) -> bool {
        let values = [self.min_lat, self.min_lon, self.max_lat, self.max_lon];
        values.iter().all(|v| v.is_finite())
            && (-90.0..=90.0).contains(&self.min_lat)
            && (-90.0..=90.0).contains(&self.max_lat)
            && (-180.0..=180.0).contains(&self.min_lon)
            && (-180.0..=180.0).contains(&self.max_lon)
            && self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
    }
}

/// Relative vessel type weights
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeWeights {
    pub cargo: f64,
    pub tanker: f64,
    pub fishing: f64,
    pub passenger: f64,
    pub other: f64,
}

impl Default for TypeWeights {
    fn default() -> Self {
        Self {
            cargo: 40.0,
            tanker: 25.0,
            fishing: 15.0,
            passenger: 10.0,
            other: 10.0,
        }
    }
}

impl TypeWeights {
    /// Weights in `VesselType::ALL` order.
    pub fn as_array(&self) -> [f64; 5] {
        [self.cargo, self.tanker, self.fishing, self.passenger, self.other]
    }
}
