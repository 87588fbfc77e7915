// Port authority model: a fixed table of container ports with drifting
// occupancy and queues

use rand::Rng;
use serde::Serialize;


/// Static description of a port
struct PortSpec {
    code: &'static str,
    name: &'static str,
    country: &'static str,
    berths: u32,
}

const PORTS: [PortSpec; 15] = [
    PortSpec { code: "SGSIN", name: "Singapore", country: "Singapore", berths: 180 },
    PortSpec { code: "CNSHA", name: "Shanghai", country: "China", berths: 250 },
    PortSpec { code: "NLRTM", name: "Rotterdam", country: "Netherlands", berths: 150 },
    PortSpec { code: "CNNGB", name: "Ningbo", country: "China", berths: 120 },
    PortSpec { code: "CNSZX", name: "Shenzhen", country: "China", berths: 100 },
    PortSpec { code: "KRPUS", name: "Busan", country: "South Korea", berths: 90 },
    PortSpec { code: "HKHKG", name: "Hong Kong", country: "Hong Kong", berths: 95 },
    PortSpec { code: "DEHAM", name: "Hamburg", country: "Germany", berths: 80 },
    PortSpec { code: "USNYC", name: "New York", country: "United States", berths: 130 },
    PortSpec { code: "USLAX", name: "Los Angeles", country: "United States", berths: 160 },
    PortSpec { code: "AEDXB", name: "Dubai", country: "UAE", berths: 110 },
    PortSpec { code: "LKCMB", name: "Colombo", country: "Sri Lanka", berths: 70 },
    PortSpec { code: "MYPKG", name: "Port Klang", country: "Malaysia", berths: 85 },
    PortSpec { code: "VNVUT", name: "Vung Tau", country: "Vietnam", berths: 55 },
    PortSpec { code: "THBKK", name: "Laem Chabang", country: "Thailand", berths: 65 },
];

/// Number of simulated ports
pub const PORT_COUNT: usize = PORTS.len();

/// Occupancy stays within this band (percent)
const MIN_OCCUPANCY: f64 = 20.0;
const MAX_OCCUPANCY: f64 = 100.0;
/// Largest occupancy change per tick (percent points)
const OCCUPANCY_STEP: f64 = 3.0;
/// Queue change per tick, inclusive
const QUEUE_STEP: (i64, i64) = (-2, 3);

/// Cargo handled at a berth, for turnaround times
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoClass {
    Container,
    Bulk,
    Tanker,
}

impl CargoClass {
    pub const ALL: [CargoClass; 3] = [CargoClass::Container, CargoClass::Bulk, CargoClass::Tanker];

    pub fn as_str(&self) -> &'static str {
        match self {
            CargoClass::Container => "container",
            CargoClass::Bulk => "bulk",
            CargoClass::Tanker => "tanker",
        }
    }

    /// Uncongested turnaround range (hours).
    fn turnaround_range(&self) -> (f64, f64) {
        match self {
            CargoClass::Container => (8.0, 48.0),
            CargoClass::Bulk => (24.0, 96.0),
            CargoClass::Tanker => (12.0, 60.0),
        }
    }

    fn index(&self) -> usize {
        match self {
            CargoClass::Container => 0,
            CargoClass::Bulk => 1,
            CargoClass::Tanker => 2,
        }
    }
}

/// One port's operating state.
///
/// Identity fields never change, so every series a port exports keeps the
/// same labels for the life of the process.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Port {
    /// UN/LOCODE, used as the `port_code` label
    pub code: &'static str,
    pub name: &'static str,
    pub country: &'static str,
    pub berth_capacity: u32,

    /// Berths in use, percent of capacity
    pub occupancy_percent: f64,

    /// Vessels waiting for a berth
    pub queue_length: u32,

    /// Uncongested turnaround per cargo class (hours)
    base_turnaround_hours: [f64; 3],

    /// Crane throughput with no congestion (TEU per hour)
    base_throughput_teu: f64,
}

impl Port {
    /// Build the port table with randomized starting conditions.
    pub fn table<R: Rng + ?Sized>(rng: &mut R) -> Vec<Port> {
        PORTS
            .iter()
            .map(|spec| {
                let occupancy_percent = rng.gen_range(40.0..=95.0);
                let queue_length = rng.gen_range(0..=20);
                let mut base_turnaround_hours = [0.0; 3];
                for class in CargoClass::ALL {
                    let (low, high) = class.turnaround_range();
                    base_turnaround_hours[class.index()] = rng.gen_range(low..=high);
                }
                let base_throughput_teu = rng.gen_range(50.0..=300.0);

                Port {
                    code: spec.code,
                    name: spec.name,
                    country: spec.country,
                    berth_capacity: spec.berths,
                    occupancy_percent,
                    queue_length,
                    base_turnaround_hours,
                    base_throughput_teu,
                }
            })
            .collect()
    }

    /// Advance one tick: occupancy random-walks, the queue grows or drains.
    /// Always two draws.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let occupancy_delta: f64 = rng.gen_range(-OCCUPANCY_STEP..=OCCUPANCY_STEP);
        let queue_delta: i64 = rng.gen_range(QUEUE_STEP.0..=QUEUE_STEP.1);

        self.occupancy_percent =
            (self.occupancy_percent + occupancy_delta).clamp(MIN_OCCUPANCY, MAX_OCCUPANCY);
        self.queue_length = (self.queue_length as i64 + queue_delta).max(0) as u32;
    }

    pub fn berths_occupied(&self) -> u32 {
        (self.occupancy_percent / 100.0 * self.berth_capacity as f64) as u32
    }

    /// Congestion from occupancy and queue, 0 to 100.
    pub fn congestion_index(&self) -> f64 {
        (self.occupancy_percent * 0.7 + self.queue_length as f64 * 2.0).min(100.0)
    }

    /// Turnaround including congestion: up to 50% slower when fully congested.
    pub fn turnaround_hours(&self, class: CargoClass) -> f64 {
        self.base_turnaround_hours[class.index()] * (1.0 + self.congestion_index() / 100.0 * 0.5)
    }

    /// Throughput including congestion: 120% of base when idle, 80% when
    /// fully congested.
    pub fn throughput_teu_per_hour(&self) -> f64 {
        self.base_throughput_teu * (1.2 - self.congestion_index() / 100.0 * 0.4)
    }
}
