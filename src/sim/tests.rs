use super::*;
use crate::config::ExporterConfig;
use crate::fleet::{BoundingBox, Fleet, FleetError, IdScheme};
use crate::port::Port;
use crate::sim::kinematics::haversine_nm;
use crate::snapshot::FleetStore;
use crate::vessel::{Vessel, VesselStatus};
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::sync::watch;

fn small_config(vessel_count: usize) -> ExporterConfig {
    let mut config = ExporterConfig::default();
    config.fleet.vessel_count = vessel_count;
    config.fleet.id_scheme = IdScheme::Sequential;
    config
}

fn engine(config: &ExporterConfig) -> SimulationEngine {
    SimulationEngine::new(config, FleetStore::new()).unwrap()
}

/// Vessel state minus the wall-clock stamp
fn kinematic_state(vessels: &[Vessel]) -> Vec<(String, f64, f64, f64, f64, VesselStatus, f64)> {
    vessels
        .iter()
        .map(|v| {
            (
                v.id.clone(),
                v.position.latitude,
                v.position.longitude,
                v.heading,
                v.speed,
                v.status,
                v.fuel_level,
            )
        })
        .collect()
}

#[test]
fn test_nothing_published_before_first_tick() {
    let engine = engine(&small_config(5));
    assert!(!engine.store().is_ready());
    assert_eq!(engine.tick_count(), 0);
}

#[test]
fn test_tick_publishes_snapshot() {
    let mut engine = engine(&small_config(5));
    let report = engine.tick();

    assert_eq!(report.tick, 1);
    assert_eq!(report.updated, 5);
    assert_eq!(report.failed, 0);

    let snapshot = engine.store().load().unwrap();
    assert_eq!(snapshot.tick, 1);
    assert_eq!(snapshot.vessel_count(), 5);
    assert_eq!(snapshot.sim_elapsed_secs, 300.0);
    for vessel in &snapshot.vessels {
        assert_eq!(vessel.last_update.tick, 1);
    }
}

#[test]
fn test_invariants_hold_over_many_ticks() {
    let mut config = small_config(40);
    // Crank anomalies so every branch gets exercised
    config.anomalies.sudden_stop = AnomalyToggle::new(0.2);
    config.anomalies.speed_spike = AnomalyToggle::new(0.2);
    config.anomalies.position_jump = AnomalyToggle::new(0.2);
    let mut engine = engine(&config);

    let mut last_elapsed = 0.0;
    for _ in 0..200 {
        engine.tick();
        let snapshot = engine.store().load().unwrap();
        assert!(snapshot.sim_elapsed_secs > last_elapsed);
        last_elapsed = snapshot.sim_elapsed_secs;

        for vessel in &snapshot.vessels {
            assert!(vessel.within_invariants(), "{:?}", vessel);
            assert!(vessel.speed <= vessel.vessel_type.max_speed());
        }
    }
    assert!(engine.store().load().unwrap().anomaly_totals.total() > 0);
}

#[test]
fn test_same_seed_same_trajectory() {
    let config = small_config(20);
    let mut a = engine(&config);
    let mut b = engine(&config);

    for _ in 0..25 {
        a.tick();
        b.tick();
    }

    assert_eq!(
        kinematic_state(a.fleet().vessels()),
        kinematic_state(b.fleet().vessels())
    );
}

#[test]
fn test_different_seed_diverges() {
    let config = small_config(20);
    let mut other = config.clone();
    other.fleet.seed = config.fleet.seed + 1;

    let mut a = engine(&config);
    let mut b = engine(&other);
    a.tick();
    b.tick();

    assert_ne!(
        kinematic_state(a.fleet().vessels()),
        kinematic_state(b.fleet().vessels())
    );
}

#[test]
fn test_tick_at_stamps_wall_clock() {
    let mut engine = engine(&small_config(3));
    let wall = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    engine.tick_at(wall);

    let snapshot = engine.store().load().unwrap();
    assert_eq!(snapshot.published_at, wall);
    assert!(snapshot.vessels.iter().all(|v| v.last_update.wall == wall));
}

#[test]
fn test_single_tick_displacement_is_bounded() {
    let mut config = small_config(3);
    config.fleet.seed = 42;
    config.fleet.bounds = BoundingBox {
        min_lat: 0.0,
        min_lon: 0.0,
        max_lat: 1.0,
        max_lon: 1.0,
    };
    config.anomalies = AnomalyConfig::disabled();
    let mut engine = engine(&config);

    let before = engine.fleet().vessels().to_vec();
    for vessel in &before {
        assert!((0.0..=1.0).contains(&vessel.position.latitude));
        assert!((0.0..=1.0).contains(&vessel.position.longitude));
    }

    engine.tick();
    let delta = config.simulation.speed_delta_knots;
    let hours = config.simulation.tick_duration_secs / 3600.0;

    for (old, new) in before.iter().zip(engine.fleet().vessels()) {
        let moved = haversine_nm(old.position, new.position);
        let ceiling = if old.status == VesselStatus::Underway && new.status == VesselStatus::Underway
        {
            old.speed + delta
        } else {
            old.max_speed
        };
        assert!(
            moved <= ceiling * hours + 1e-6,
            "{} moved {} nm, ceiling {}",
            old.id,
            moved,
            ceiling * hours
        );
    }
}

#[test]
fn test_decommissioned_vessels_are_frozen() {
    let mut engine = engine(&small_config(4));
    engine.tick();
    engine.decommission("V0003").unwrap();

    let frozen = engine.fleet().get("V0003").unwrap().clone();
    assert_eq!(frozen.status, VesselStatus::Decommissioned);
    assert_eq!(frozen.speed, 0.0);

    // Without a reader observing it the vessel stays put
    for _ in 0..5 {
        engine.tick();
    }
    let still = engine.fleet().get("V0003").unwrap();
    assert_eq!(still.position, frozen.position);
    assert_eq!(still.fuel_level, frozen.fuel_level);
    assert_eq!(still.last_update, frozen.last_update);
}

#[test]
fn test_decommission_publishes_immediately() {
    let mut engine = engine(&small_config(4));
    engine.tick();
    engine.decommission("V0001").unwrap();

    let snapshot = engine.store().load().unwrap();
    assert_eq!(snapshot.tick, 1);
    assert_eq!(
        snapshot.get("V0001").unwrap().status,
        VesselStatus::Decommissioned
    );
    assert!(snapshot.has_terminal());
}

#[test]
fn test_decommission_errors() {
    let mut engine = engine(&small_config(2));
    engine.tick();

    assert_eq!(
        engine.decommission("V0099"),
        Err(EngineError::Fleet(FleetError::UnknownVessel("V0099".to_string())))
    );
    engine.decommission("V0002").unwrap();
    assert_eq!(
        engine.decommission("V0002"),
        Err(EngineError::Fleet(FleetError::AlreadyDecommissioned(
            "V0002".to_string()
        )))
    );
}

#[test]
fn test_pruned_only_after_observation() {
    let mut engine = engine(&small_config(3));
    engine.tick();
    engine.decommission("V0002").unwrap();

    // Unobserved: kept
    let report = engine.tick();
    assert_eq!(report.pruned, 0);
    assert!(engine.fleet().get("V0002").is_some());

    engine.store().load().unwrap().mark_terminal_observed();
    let report = engine.tick();
    assert_eq!(report.pruned, 1);
    assert!(engine.fleet().get("V0002").is_none());
    assert!(!engine.store().load().unwrap().has_terminal());
}

#[test]
fn test_prune_can_be_disabled() {
    let mut config = small_config(3);
    config.fleet.prune_decommissioned = false;
    let mut engine = engine(&config);
    engine.tick();
    engine.decommission("V0002").unwrap();

    engine.store().load().unwrap().mark_terminal_observed();
    let report = engine.tick();
    assert_eq!(report.pruned, 0);
    assert!(engine.fleet().get("V0002").is_some());
}

#[test]
fn test_anomaly_totals_survive_pruning() {
    let mut config = small_config(10);
    config.anomalies.sudden_stop = AnomalyToggle::new(1.0);
    config.simulation.transitions = TransitionConfig {
        moored_to_underway: 1.0,
        anchored_to_underway: 1.0,
        anchored_to_moored: 0.0,
        adrift_to_underway: 1.0,
        underway_to_moored: 0.0,
        underway_to_anchored: 0.0,
        underway_to_adrift: 0.0,
    };
    let mut engine = engine(&config);
    engine.tick();

    let totals = engine.store().load().unwrap().anomaly_totals;
    assert_eq!(totals.sudden_stop, 10);

    engine.decommission("V0001").unwrap();
    engine.store().load().unwrap().mark_terminal_observed();
    engine.tick();

    let snapshot = engine.store().load().unwrap();
    assert_eq!(snapshot.vessel_count(), 9);
    assert_eq!(snapshot.anomaly_totals.sudden_stop, 19);
}

#[test]
fn test_held_snapshot_unaffected_by_later_ticks() {
    let mut engine = engine(&small_config(5));
    engine.tick();
    let held = engine.store().load().unwrap();
    let held_state = kinematic_state(&held.vessels);

    for _ in 0..10 {
        engine.tick();
    }

    assert_eq!(held.tick, 1);
    assert_eq!(kinematic_state(&held.vessels), held_state);
    assert_eq!(engine.store().load().unwrap().tick, 11);
}

#[tokio::test]
async fn test_run_loop_ticks_and_serves_commands() {
    let mut config = small_config(3);
    config.simulation.tick_interval_secs = 1;
    let store = FleetStore::new();
    let engine = SimulationEngine::new(&config, store.clone()).unwrap();

    let (handle, commands) = command_channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(commands, shutdown_rx));

    // First tick fires immediately
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.is_ready());

    handle.decommission("V0001").await.unwrap();
    assert_eq!(
        store.load().unwrap().get("V0001").unwrap().status,
        VesselStatus::Decommissioned
    );
    assert!(matches!(
        handle.decommission("V0001").await,
        Err(EngineError::Fleet(FleetError::AlreadyDecommissioned(_)))
    ));

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(store.load().unwrap().tick >= 2);

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(
        handle.decommission("V0002").await,
        Err(EngineError::Unavailable)
    );
}

/// A vessel whose step fails keeps its old state; the rest of the fleet
/// still advances and the tick is still published.
#[test]
fn test_failed_vessel_isolated() {
    let mut config = small_config(5);
    config.simulation.transitions = TransitionConfig {
        underway_to_moored: 0.0,
        underway_to_anchored: 0.0,
        underway_to_adrift: 0.0,
        anchored_to_moored: 0.0,
        anchored_to_underway: 0.0,
        moored_to_underway: 0.0,
        adrift_to_underway: 0.0,
    };
    config.anomalies = AnomalyConfig::disabled();

    let mut vessels = engine(&config).fleet().vessels().to_vec();
    vessels[2].status = VesselStatus::Underway;
    vessels[2].speed = f64::NAN;
    let broken = vessels[2].clone();
    let fleet = Fleet::from_vessels(vessels).unwrap();

    let store = FleetStore::new();
    let mut engine =
        SimulationEngine::from_parts(fleet, StdRng::seed_from_u64(3), &config, store.clone());
    let wall = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let report = engine.tick_at(wall);

    assert_eq!(report.tick, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.updated, 4);

    let snapshot = store.load().unwrap();
    assert_eq!(snapshot.tick, 1);
    for vessel in &snapshot.vessels {
        if vessel.id == broken.id {
            assert!(vessel.speed.is_nan());
            assert_eq!(vessel.position, broken.position);
            assert_eq!(vessel.heading, broken.heading);
            assert_eq!(vessel.fuel_level, broken.fuel_level);
            assert_eq!(vessel.ais_signal_quality, broken.ais_signal_quality);
            assert_eq!(vessel.last_update, broken.last_update);
        } else {
            assert_eq!(vessel.last_update.tick, 1);
            assert_eq!(vessel.last_update.wall, wall);
            assert!(vessel.within_invariants(), "{:?}", vessel);
        }
    }

    // Ports still advance
    let initial_ports = Port::table(&mut StdRng::seed_from_u64(3));
    assert_eq!(snapshot.ports.len(), initial_ports.len());
    assert_ne!(snapshot.ports, initial_ports);
}
