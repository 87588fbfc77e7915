// End-to-end simulation scenarios through the engine, store and registry

use maritime_exporter::config::{AnomalyConfig, BoundingBox, ExporterConfig, IdScheme};
use maritime_exporter::metrics::{MetricFamily, MetricsRegistry};
use maritime_exporter::sim::SimulationEngine;
use maritime_exporter::snapshot::FleetStore;
use maritime_exporter::vessel::VesselStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn setup(config: &ExporterConfig) -> (SimulationEngine, MetricsRegistry) {
    let store = FleetStore::new();
    let engine = SimulationEngine::new(config, store.clone()).unwrap();
    let registry = MetricsRegistry::new(store, &config.registry);
    (engine, registry)
}

fn sequential(vessel_count: usize) -> ExporterConfig {
    let mut config = ExporterConfig::default();
    config.fleet.vessel_count = vessel_count;
    config.fleet.id_scheme = IdScheme::Sequential;
    config
}

fn status_of(families: &[MetricFamily], id: &str) -> Option<f64> {
    families
        .iter()
        .find(|f| f.name == "vessel_status_code")?
        .find("vessel_id", id)
        .map(|s| s.value)
}

/// Seed 42, three vessels in a one-degree box, five simulated minutes.
#[test]
fn test_small_box_scenario() {
    let mut config = sequential(3);
    config.fleet.seed = 42;
    config.fleet.bounds = BoundingBox {
        min_lat: 0.0,
        min_lon: 0.0,
        max_lat: 1.0,
        max_lon: 1.0,
    };
    config.simulation.tick_duration_secs = 300.0;
    config.anomalies = AnomalyConfig::disabled();
    let (mut engine, registry) = setup(&config);

    engine.tick();
    let families = registry.collect().unwrap();
    let lat = families
        .iter()
        .find(|f| f.name == "vessel_latitude_degrees")
        .unwrap();
    assert_eq!(lat.samples.len(), 3);

    // Fastest hull covers at most 30 kn * 5 min = 2.5 nm, well under 0.05 deg
    for sample in &lat.samples {
        assert!((-0.05..=1.05).contains(&sample.value), "{}", sample.value);
    }
    assert_eq!(
        MetricsRegistry::expected_series(3),
        families.iter().map(|f| f.samples.len()).sum::<usize>()
    );
}

/// A decommissioned vessel is reported once as terminal, then removed.
#[test]
fn test_decommission_window() {
    let (mut engine, registry) = setup(&sequential(4));
    engine.tick();

    engine.decommission("V0003").unwrap();
    let families = registry.collect().unwrap();
    assert_eq!(
        status_of(&families, "V0003"),
        Some(VesselStatus::Decommissioned.code())
    );

    let report = engine.tick();
    assert_eq!(report.pruned, 1);

    let families = registry.collect().unwrap();
    assert_eq!(status_of(&families, "V0003"), None);
    assert!(status_of(&families, "V0001").is_some());
    assert_eq!(
        families.iter().map(|f| f.samples.len()).sum::<usize>(),
        MetricsRegistry::expected_series(3)
    );
}

/// Without a scrape in between, the terminal state is not skipped.
#[test]
fn test_unscraped_decommission_is_kept() {
    let (mut engine, registry) = setup(&sequential(4));
    engine.tick();
    engine.decommission("V0001").unwrap();

    engine.tick();
    engine.tick();

    let families = registry.collect().unwrap();
    assert_eq!(
        status_of(&families, "V0001"),
        Some(VesselStatus::Decommissioned.code())
    );

    engine.tick();
    assert_eq!(status_of(&registry.collect().unwrap(), "V0001"), None);
}

/// Readers racing the writer only ever see whole snapshots.
#[test]
fn test_readers_never_see_mixed_ticks() {
    let config = sequential(200);
    let (mut engine, registry) = setup(&config);
    let store = engine.store().clone();
    engine.tick();

    let done = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let registry = registry.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut checked = 0;
                while !done.load(Ordering::Acquire) {
                    let snapshot = store.load().unwrap();
                    let tick = snapshot.tick;
                    assert!(snapshot
                        .vessels
                        .iter()
                        .all(|v| v.last_update.tick == tick));

                    let families = registry.collect().unwrap();
                    let ticks = families
                        .iter()
                        .find(|f| f.name == "simulation_ticks_total")
                        .unwrap();
                    assert!(ticks.samples[0].value >= tick as f64);
                    checked += 1;
                }
                checked
            })
        })
        .collect();

    for _ in 0..200 {
        engine.tick();
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
}

/// Restarting with the same seed reproduces the same exposition.
#[test]
fn test_restart_with_same_seed_reproduces_metrics() {
    let config = {
        let mut c = ExporterConfig::default();
        c.fleet.vessel_count = 10;
        c
    };

    let run = || {
        let (mut engine, registry) = setup(&config);
        for _ in 0..10 {
            engine.tick();
        }
        registry
            .collect()
            .unwrap()
            .into_iter()
            .filter(|f| f.name != "simulation_last_tick_timestamp_seconds")
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}
