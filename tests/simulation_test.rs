//! Orchestrator tests: entity creation, run timing and report aggregation

use fleet_sim::simulation::{
    FleetReport, SimError, Simulation, SimulationConfig, TimeScale, VehicleId, VehicleSnapshot,
    VehicleState, VEHICLE_SPECS,
};
use std::time::{Duration, Instant};

fn fast_config(vehicles: usize, vehicle_types: usize, chargers: usize) -> SimulationConfig {
    SimulationConfig {
        time_scale: TimeScale::new(Duration::from_millis(10)),
        seed: Some(42),
        ..SimulationConfig::new(vehicles, vehicle_types, chargers)
    }
}

/// Test that Create builds one entity per vehicle and per charger
#[test]
fn test_create_counts_entities() {
    let mut simulation =
        Simulation::new(SimulationConfig::new(10, 5, 10)).expect("config should be valid");

    assert_eq!(simulation.create().expect("create should succeed"), 20);
    assert_eq!(simulation.entity_count(), 20);
    assert_eq!(simulation.vehicles().count(), 10);
}

#[test]
fn test_create_twice_is_rejected() {
    let mut simulation = Simulation::new(SimulationConfig::default()).expect("valid config");
    simulation.create().expect("first create should succeed");

    assert!(matches!(simulation.create(), Err(SimError::AlreadyCreated)));
    assert_eq!(simulation.entity_count(), 23);
}

#[test]
fn test_invalid_vehicle_type_counts() {
    assert!(matches!(
        Simulation::new(SimulationConfig::new(5, 0, 3)),
        Err(SimError::InvalidConfig(_))
    ));
    assert!(matches!(
        Simulation::new(SimulationConfig::new(5, 6, 3)),
        Err(SimError::InvalidConfig(_))
    ));
    assert!(Simulation::new(SimulationConfig::new(0, 0, 3)).is_ok());
}

#[test]
fn test_vehicle_types_limited_to_requested_range() {
    let mut simulation = Simulation::new(fast_config(40, 2, 1)).expect("valid config");
    simulation.create().expect("create should succeed");

    assert!(simulation
        .vehicles()
        .all(|v| v.spec().name == "A" || v.spec().name == "B"));
}

#[test]
fn test_seeded_type_assignment_is_reproducible() {
    let types_for = |seed| {
        let mut simulation = Simulation::new(SimulationConfig {
            seed: Some(seed),
            ..SimulationConfig::default()
        })
        .expect("valid config");
        simulation.create().expect("create should succeed");
        simulation
            .vehicles()
            .map(|v| v.spec().name)
            .collect::<Vec<_>>()
    };

    assert_eq!(types_for(7), types_for(7));
}

/// Test that a 10 second run returns within a second of its window
#[test]
fn test_run_duration() {
    let mut simulation =
        Simulation::new(SimulationConfig::new(10, 5, 10)).expect("valid config");
    simulation.create().expect("create should succeed");

    let started = Instant::now();
    let report = simulation
        .run(Duration::from_secs(10))
        .expect("run should succeed");
    let elapsed = started.elapsed().as_secs_f64();

    assert!((elapsed - 10.0).abs() <= 1.0, "run took {:.2}s", elapsed);
    assert_eq!(report.vehicle_count(), 10);
    assert!((report.simulated_minutes - 10.0).abs() < 1e-9);
}

#[test]
fn test_run_leaves_no_open_timers() {
    let mut simulation = Simulation::new(fast_config(20, 5, 3)).expect("valid config");
    simulation.create().expect("create should succeed");

    let report = simulation
        .run(Duration::from_secs(2))
        .expect("run should succeed");

    assert!(simulation.queue().is_empty());
    for vehicle in simulation.vehicles() {
        let snapshot = vehicle.snapshot();
        assert_eq!(snapshot.open_timers, 0, "{} left a timer open", vehicle.header());
        assert_ne!(snapshot.state, VehicleState::Initial);
    }

    assert_eq!(report.vehicle_count(), 20);
    assert!((report.simulated_minutes - 200.0).abs() < 1e-9);
    for t in &report.types {
        let accounted = t.cruise_percent + t.charge_percent + t.queue_percent;
        assert!(accounted <= 110.0, "type {} accounts for {:.1}%", t.name, accounted);
        assert!(t.avg_cruise_minutes > 0.0);
        assert!(t.max_faults >= 0.0);
    }
}

#[test]
fn test_run_with_three_chargers_builds_a_queue() {
    let mut simulation = Simulation::new(fast_config(20, 5, 3)).expect("valid config");
    simulation.create().expect("create should succeed");

    let report = simulation
        .run(Duration::from_secs(3))
        .expect("run should succeed");

    // 20 vehicles cannot all be served by 3 chargers without waiting
    let total_queue: f64 = report
        .types
        .iter()
        .map(|t| t.avg_queue_minutes * t.vehicle_count as f64)
        .sum();
    assert!(total_queue > 0.0);
}

#[test]
fn test_run_twice_fails() {
    let mut simulation = Simulation::new(fast_config(2, 1, 1)).expect("valid config");
    simulation.create().expect("create should succeed");
    simulation
        .run(Duration::from_millis(100))
        .expect("first run should succeed");

    assert!(matches!(
        simulation.run(Duration::from_millis(100)),
        Err(SimError::AlreadyStarted(_))
    ));
}

#[test]
fn test_report_aggregates_by_type() {
    let scale = TimeScale::default();
    let snapshot = |id, spec_index: usize, cruising, charging, queueing| VehicleSnapshot {
        id: VehicleId(id),
        spec: &VEHICLE_SPECS[spec_index],
        state: VehicleState::Cruising,
        cruising: Duration::from_secs(cruising),
        charging: Duration::from_secs(charging),
        queueing: Duration::from_secs(queueing),
        cruise_legs: 1,
        charge_sessions: 1,
        open_timers: 0,
    };

    let snapshots = vec![
        snapshot(0, 0, 30, 12, 6),
        snapshot(1, 0, 10, 20, 10),
        snapshot(2, 4, 60, 0, 0),
    ];
    let report = FleetReport::from_snapshots(&snapshots, scale, 60.0);

    assert_eq!(report.types.len(), 2);
    assert_eq!(report.vehicle_count(), 3);

    let a = report.get("A").expect("type A present");
    assert_eq!(a.vehicle_count, 2);
    assert!((a.avg_cruise_minutes - 20.0).abs() < 1e-9);
    assert!((a.avg_charge_minutes - 16.0).abs() < 1e-9);
    assert!((a.avg_queue_minutes - 8.0).abs() < 1e-9);
    assert!((a.cruise_percent - 100.0 / 3.0).abs() < 1e-9);
    // 0.25 faults/hr * 1 hr * 2 vehicles
    assert!((a.max_faults - 0.5).abs() < 1e-9);
    // 4 passengers * 120 mph * (40 min / 60)
    assert!((a.passenger_miles - 320.0).abs() < 1e-9);

    let e = report.get("E").expect("type E present");
    assert!((e.cruise_percent - 100.0).abs() < 1e-9);
    assert!((e.max_faults - 0.61).abs() < 1e-9);
    assert!(report.get("B").is_none());

    let table = report.to_string();
    assert!(table.contains("Fleet Simulation Report"));
    assert!(table.lines().any(|line| line.starts_with("A ")));
}
