use super::*;
use chrono::Utc;

fn make_vessel() -> Vessel {
    Vessel {
        id: "V0001".to_string(),
        name: "Ocean Pioneer".to_string(),
        vessel_type: VesselType::Tanker,
        flag: "PA".to_string(),
        operator: "Maersk".to_string(),
        position: Position::new(12.5, -45.0),
        heading: 90.0,
        speed: 12.0,
        max_speed: 14.0,
        status: VesselStatus::Underway,
        fuel_level: 80.0,
        nominal_fuel_burn_mt: 120.0,
        fuel_consumption_mt_per_day: 120.0,
        charter_rate_usd: 100_000.0,
        ais_signal_quality: 95.0,
        compliance_violations: 0,
        anomalies: AnomalyCounts::default(),
        last_update: UpdateStamp::initial(Utc::now()),
    }
}

#[test]
fn test_type_speed_envelopes() {
    for vessel_type in VesselType::ALL {
        assert!(vessel_type.cruise_speed() > 0.0);
        assert!(vessel_type.cruise_speed() < vessel_type.max_speed());
    }
    assert_eq!(VesselType::Passenger.max_speed(), 30.0);
    assert_eq!(VesselType::Fishing.cruise_speed(), 4.0);
}

#[test]
fn test_only_decommissioned_is_terminal() {
    let terminal: Vec<_> = VesselStatus::ALL
        .iter()
        .filter(|s| s.is_terminal())
        .collect();
    assert_eq!(terminal, vec![&VesselStatus::Decommissioned]);
}

#[test]
fn test_status_codes_are_distinct() {
    let mut codes: Vec<f64> = VesselStatus::ALL.iter().map(|s| s.code()).collect();
    codes.dedup();
    assert_eq!(codes.len(), VesselStatus::ALL.len());
}

#[test]
fn test_serde_names_match_labels() {
    assert_eq!(
        serde_json::to_value(VesselType::Passenger).unwrap(),
        serde_json::json!("passenger")
    );
    assert_eq!(
        serde_json::to_value(VesselStatus::Decommissioned).unwrap(),
        serde_json::json!("decommissioned")
    );
    assert_eq!(VesselStatus::Adrift.to_string(), "adrift");
}

#[test]
fn test_anomaly_counts() {
    let mut counts = AnomalyCounts::default();
    counts.record(AnomalyKind::SpeedSpike);
    counts.record(AnomalyKind::SpeedSpike);
    counts.record(AnomalyKind::PositionJump);

    assert_eq!(counts.get(AnomalyKind::SpeedSpike), 2);
    assert_eq!(counts.get(AnomalyKind::SuddenStop), 0);
    assert_eq!(counts.total(), 3);
}

#[test]
fn test_position_bounds() {
    assert!(Position::new(90.0, 180.0).is_valid());
    assert!(Position::new(-90.0, -180.0).is_valid());
    assert!(!Position::new(90.1, 0.0).is_valid());
    assert!(!Position::new(0.0, -180.5).is_valid());
    assert!(!Position::new(f64::NAN, 0.0).is_valid());
}

#[test]
fn test_invariants() {
    let mut vessel = make_vessel();
    assert!(vessel.within_invariants());

    vessel.heading = 360.0;
    assert!(!vessel.within_invariants());
    vessel.heading = 0.0;

    // Tanker type max is 16 knots
    vessel.speed = 16.5;
    assert!(!vessel.within_invariants());
    vessel.speed = 16.0;
    assert!(vessel.within_invariants());

    vessel.fuel_level = -0.1;
    assert!(!vessel.within_invariants());
}

#[test]
fn test_fuel_efficiency() {
    let mut vessel = make_vessel();
    // 12 kn for a day is 533.376 km, on 120 t
    assert!((vessel.fuel_efficiency_km_per_mt() - 4.4448).abs() < 1e-9);

    vessel.fuel_consumption_mt_per_day = 0.0;
    assert_eq!(vessel.fuel_efficiency_km_per_mt(), 0.0);
}

#[test]
fn test_revenue_follows_status() {
    let mut vessel = make_vessel();
    assert_eq!(vessel.revenue_per_day_usd(), 100_000.0);

    vessel.status = VesselStatus::Moored;
    assert_eq!(vessel.revenue_per_day_usd(), 80_000.0);
    vessel.status = VesselStatus::Anchored;
    assert_eq!(vessel.revenue_per_day_usd(), 30_000.0);
    vessel.status = VesselStatus::Decommissioned;
    assert_eq!(vessel.revenue_per_day_usd(), 0.0);
}

#[test]
fn test_compliance_score() {
    let mut vessel = make_vessel();
    // (100 + 95 + 90) / 3
    assert!((vessel.compliance_score() - 95.0).abs() < 1e-9);

    vessel.speed = SPEED_LIMIT_KNOTS + 1.0;
    vessel.compliance_violations = 5;
    // (70 + 95 + 60) / 3
    assert!((vessel.compliance_score() - 75.0).abs() < 1e-9);
}
