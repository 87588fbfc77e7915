use super::config::{RegistryConfig, VesselLabel};
use super::encode::encode_text;
use super::{MetricFamily, MetricKind, RegistryError};
use crate::port::{CargoClass, Port, PORT_COUNT};
use crate::snapshot::{FleetSnapshot, FleetStore};
use crate::vessel::{AnomalyKind, Vessel, VesselStatus, VesselType};
use tracing::debug;

/// Number of families carrying one series per vessel
pub const PER_VESSEL_FAMILIES: usize = 12;

/// Port families with one series per port; turnaround adds one per cargo class
const PORT_FAMILIES: usize = 6;

/// Series count of the port families. The port table is fixed.
pub const PORT_SERIES: usize = PORT_COUNT * (PORT_FAMILIES + CargoClass::ALL.len());

/// Series count of the fleet-wide families, independent of fleet size:
/// fleet_vessels (1), by_status (5), by_type (5), utilization (5),
/// anomaly totals (3), ticks (1), elapsed (1), last tick timestamp (1).
pub const AGGREGATE_SERIES: usize = 1
    + VesselStatus::ALL.len()
    + VesselType::ALL.len() * 2
    + AnomalyKind::ALL.len()
    + 3;

/// Turns the latest published snapshot into metric families.
///
/// Holds no fleet state of its own; every collect reads whatever the store
/// currently points at.
#[derive(Clone, Debug)]
pub struct MetricsRegistry {
    store: FleetStore,
    extra_labels: Vec<VesselLabel>,
}

impl MetricsRegistry {
    pub fn new(store: FleetStore, config: &RegistryConfig) -> Self {
        Self {
            store,
            extra_labels: config.extra_labels.clone(),
        }
    }

    /// Series exposed for a fleet of `vessel_count` vessels.
    pub fn expected_series(vessel_count: usize) -> usize {
        vessel_count * PER_VESSEL_FAMILIES + AGGREGATE_SERIES + PORT_SERIES
    }

    /// Collect every family from the current snapshot.
    ///
    /// A successful collect counts as observing the snapshot, which lets the
    /// engine prune vessels whose decommissioning has now been reported.
    pub fn collect(&self) -> Result<Vec<MetricFamily>, RegistryError> {
        let snapshot = self.store.load().ok_or(RegistryError::NotReady)?;
        let families = self.families(&snapshot);

        if snapshot.has_terminal() {
            snapshot.mark_terminal_observed();
        }

        Ok(families)
    }

    /// Collect and encode in the Prometheus text format.
    pub fn render(&self) -> Result<String, RegistryError> {
        let families = self.collect()?;
        encode_text(&families)
    }

    /// Build families from a specific snapshot. Pure: same snapshot, same output.
    pub fn families(&self, snapshot: &FleetSnapshot) -> Vec<MetricFamily> {
        let mut families = self.vessel_families(snapshot);
        families.extend(aggregate_families(snapshot));
        families.extend(port_families(snapshot));

        debug!(
            tick = snapshot.tick,
            vessels = snapshot.vessel_count(),
            families = families.len(),
            "Collected metrics"
        );
        families
    }

    fn vessel_families(&self, snapshot: &FleetSnapshot) -> Vec<MetricFamily> {
        let mut label_names = vec!["vessel_id", "vessel_type"];
        label_names.extend(self.extra_labels.iter().map(|l| l.label_name()));
        let stamp = snapshot.published_at.timestamp_millis();

        let metrics = vessel_metrics();
        let mut families: Vec<MetricFamily> = metrics
            .iter()
            .map(|m| MetricFamily::new(m.name, m.help, m.kind, label_names.clone(), stamp))
            .collect();

        for vessel in &snapshot.vessels {
            let mut labels = vec![vessel.id.clone(), vessel.vessel_type.as_str().to_string()];
            labels.extend(self.extra_labels.iter().map(|l| l.value(vessel).to_string()));

            for (family, metric) in families.iter_mut().zip(&metrics) {
                family.push(labels.clone(), (metric.value)(vessel));
            }
        }

        families
    }
}

/// A family with one series per entity, valued by `value`
struct EntityMetric<T> {
    name: &'static str,
    help: &'static str,
    kind: MetricKind,
    value: fn(&T) -> f64,
}

impl<T> EntityMetric<T> {
    fn gauge(name: &'static str, help: &'static str, value: fn(&T) -> f64) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            value,
        }
    }
}

fn vessel_metrics() -> [EntityMetric<Vessel>; PER_VESSEL_FAMILIES] {
    [
        EntityMetric::gauge(
            "vessel_latitude_degrees",
            "Vessel latitude in decimal degrees",
            |v: &Vessel| v.position.latitude,
        ),
        EntityMetric::gauge(
            "vessel_longitude_degrees",
            "Vessel longitude in decimal degrees",
            |v: &Vessel| v.position.longitude,
        ),
        EntityMetric::gauge(
            "vessel_heading_degrees",
            "Vessel course over ground in degrees",
            |v: &Vessel| v.heading,
        ),
        EntityMetric::gauge(
            "vessel_speed_knots",
            "Vessel speed over ground in knots",
            |v: &Vessel| v.speed,
        ),
        EntityMetric {
            name: "vessel_anomaly_events_total",
            help: "Synthetic anomalies injected into this vessel",
            kind: MetricKind::Counter,
            value: |v: &Vessel| v.anomalies.total() as f64,
        },
        EntityMetric::gauge(
            "vessel_status_code",
            "Vessel status (0=underway, 1=anchored, 2=moored, 3=adrift, 4=decommissioned)",
            |v: &Vessel| v.status.code(),
        ),
        EntityMetric::gauge(
            "vessel_fuel_level_percent",
            "Vessel fuel remaining as percent of capacity",
            |v: &Vessel| v.fuel_level,
        ),
        EntityMetric::gauge(
            "vessel_fuel_consumption_mt_per_day",
            "Vessel fuel consumption in metric tons per day",
            |v: &Vessel| v.fuel_consumption_mt_per_day,
        ),
        EntityMetric::gauge(
            "vessel_fuel_efficiency_km_per_mt",
            "Kilometers covered per metric ton of fuel at current speed",
            Vessel::fuel_efficiency_km_per_mt,
        ),
        EntityMetric::gauge(
            "vessel_revenue_per_day_usd",
            "Estimated daily revenue in USD",
            Vessel::revenue_per_day_usd,
        ),
        EntityMetric::gauge(
            "vessel_ais_signal_quality_percent",
            "AIS signal quality percentage",
            |v: &Vessel| v.ais_signal_quality,
        ),
        EntityMetric::gauge(
            "vessel_compliance_score",
            "Overall compliance score (0-100)",
            Vessel::compliance_score,
        ),
    ]
}

fn port_metrics() -> [EntityMetric<Port>; PORT_FAMILIES] {
    [
        EntityMetric::gauge(
            "port_berth_capacity_total",
            "Total berth capacity",
            |p: &Port| p.berth_capacity as f64,
        ),
        EntityMetric::gauge(
            "port_berths_occupied",
            "Number of occupied berths",
            |p: &Port| p.berths_occupied() as f64,
        ),
        EntityMetric::gauge(
            "port_berth_occupancy_percent",
            "Port berth occupancy percentage",
            |p: &Port| p.occupancy_percent,
        ),
        EntityMetric::gauge(
            "port_queue_length",
            "Number of vessels waiting for a berth",
            |p: &Port| p.queue_length as f64,
        ),
        EntityMetric::gauge(
            "port_congestion_index",
            "Port congestion index (0-100, higher = more congested)",
            Port::congestion_index,
        ),
        EntityMetric::gauge(
            "port_throughput_teu_per_hour",
            "Port throughput in TEU per hour",
            Port::throughput_teu_per_hour,
        ),
    ]
}

fn port_families(snapshot: &FleetSnapshot) -> Vec<MetricFamily> {
    let stamp = snapshot.published_at.timestamp_millis();
    let label_names = vec!["port_code", "port_name", "country"];

    let metrics = port_metrics();
    let mut families: Vec<MetricFamily> = metrics
        .iter()
        .map(|m| MetricFamily::new(m.name, m.help, m.kind, label_names.clone(), stamp))
        .collect();

    let mut turnaround = MetricFamily::new(
        "port_avg_turnaround_hours",
        "Average vessel turnaround time in hours",
        MetricKind::Gauge,
        vec!["port_code", "port_name", "country", "cargo_class"],
        stamp,
    );

    for port in &snapshot.ports {
        let labels = vec![
            port.code.to_string(),
            port.name.to_string(),
            port.country.to_string(),
        ];
        for (family, metric) in families.iter_mut().zip(&metrics) {
            family.push(labels.clone(), (metric.value)(port));
        }
        for class in CargoClass::ALL {
            let mut labels = labels.clone();
            labels.push(class.as_str().to_string());
            turnaround.push(labels, port.turnaround_hours(class));
        }
    }

    families.push(turnaround);
    families
}

fn aggregate_families(snapshot: &FleetSnapshot) -> Vec<MetricFamily> {
    let vessels = &snapshot.vessels;
    let stamp = snapshot.published_at.timestamp_millis();

    let mut total = MetricFamily::new(
        "fleet_vessels",
        "Vessels currently tracked",
        MetricKind::Gauge,
        vec![],
        stamp,
    );
    total.push(vec![], vessels.len() as f64);

    let mut by_status = MetricFamily::new(
        "fleet_vessels_by_status",
        "Vessels per status",
        MetricKind::Gauge,
        vec!["status"],
        stamp,
    );
    for status in VesselStatus::ALL {
        let count = vessels.iter().filter(|v| v.status == status).count();
        by_status.push(vec![status.as_str().to_string()], count as f64);
    }

    let mut by_type = MetricFamily::new(
        "fleet_vessels_by_type",
        "Vessels per type",
        MetricKind::Gauge,
        vec!["vessel_type"],
        stamp,
    );
    let mut utilization = MetricFamily::new(
        "fleet_utilization_percent",
        "Share of active vessels per type that are underway or moored",
        MetricKind::Gauge,
        vec!["vessel_type"],
        stamp,
    );
    for vessel_type in VesselType::ALL {
        let of_type = vessels.iter().filter(|v| v.vessel_type == vessel_type);
        let count = of_type.clone().count();
        let active = of_type.clone().filter(|v| v.is_active()).count();
        let working = of_type
            .filter(|v| matches!(v.status, VesselStatus::Underway | VesselStatus::Moored))
            .count();

        let percent = if active == 0 {
            0.0
        } else {
            working as f64 / active as f64 * 100.0
        };

        by_type.push(vec![vessel_type.as_str().to_string()], count as f64);
        utilization.push(vec![vessel_type.as_str().to_string()], percent);
    }

    let mut anomaly_totals = MetricFamily::new(
        "fleet_anomaly_events_total",
        "Synthetic anomalies injected across the fleet",
        MetricKind::Counter,
        vec!["kind"],
        stamp,
    );
    for kind in AnomalyKind::ALL {
        anomaly_totals.push(
            vec![kind.as_str().to_string()],
            snapshot.anomaly_totals.get(kind) as f64,
        );
    }

    let mut ticks = MetricFamily::new(
        "simulation_ticks_total",
        "Simulation ticks completed",
        MetricKind::Counter,
        vec![],
        stamp,
    );
    ticks.push(vec![], snapshot.tick as f64);

    let mut elapsed = MetricFamily::new(
        "simulation_elapsed_seconds",
        "Simulated time since start",
        MetricKind::Gauge,
        vec![],
        stamp,
    );
    elapsed.push(vec![], snapshot.sim_elapsed_secs);

    let mut last_tick = MetricFamily::new(
        "simulation_last_tick_timestamp_seconds",
        "Unix time the current snapshot was published",
        MetricKind::Gauge,
        vec![],
        stamp,
    );
    last_tick.push(
        vec![],
        snapshot.published_at.timestamp_millis() as f64 / 1000.0,
    );

    vec![
        total,
        by_status,
        by_type,
        utilization,
        anomaly_totals,
        ticks,
        elapsed,
        last_tick,
    ]
}
