//! Vehicle timing formulas and state machine

use fleet_sim::simulation::{
    ChargingQueue, SimEntity, TimeScale, Vehicle, VehicleEntity, VehicleId, VehicleState,
    VEHICLE_SPECS,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn spec(name: &str) -> &'static fleet_sim::simulation::VehicleSpec {
    VEHICLE_SPECS
        .iter()
        .find(|s| s.name == name)
        .expect("unknown vehicle type")
}

/// Poll `condition` until it holds or `timeout` passes
fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_cruise_time_formula() {
    // 320 / 1.6 / 120 * 60
    assert_eq!(spec("A").cruise_minutes(), 100);
    assert_eq!(spec("B").cruise_minutes(), 40);
    assert_eq!(spec("C").cruise_minutes(), 37);
    assert_eq!(spec("D").cruise_minutes(), 100);
    assert_eq!(spec("E").cruise_minutes(), 51);
}

#[test]
fn test_charge_time_formula() {
    // ceil(0.60 * 60)
    assert_eq!(spec("A").charge_minutes(), 36);
    assert_eq!(spec("B").charge_minutes(), 12);
    assert_eq!(spec("C").charge_minutes(), 48);
    assert_eq!(spec("D").charge_minutes(), 38);
    assert_eq!(spec("E").charge_minutes(), 18);
}

#[test]
fn test_default_scale_is_one_second_per_minute() {
    let vehicle = Vehicle::new(VehicleId(0), spec("A"), TimeScale::default());
    assert_eq!(vehicle.cruise_time(), Duration::from_secs(100));
    assert_eq!(vehicle.charge_time(), Duration::from_secs(36));
}

#[test]
fn test_time_scale_conversions() {
    let scale = TimeScale::new(Duration::from_millis(10));
    assert_eq!(scale.to_real(36), Duration::from_millis(360));
    assert!((scale.to_minutes(Duration::from_millis(250)) - 25.0).abs() < 1e-9);
}

#[test]
fn test_header_names_type_and_id() {
    let vehicle = Vehicle::new(VehicleId(3), spec("C"), TimeScale::default());
    assert_eq!(vehicle.header(), "<Vehicle C3>");
    assert_eq!(vehicle.state(), VehicleState::Initial);
}

#[test]
fn test_charging_hand_off_moves_timers() {
    let queue = ChargingQueue::new();
    let vehicle = Arc::new(Vehicle::new(VehicleId(0), spec("B"), TimeScale::default()));

    vehicle.needs_charged_action(&queue);
    assert_eq!(vehicle.state(), VehicleState::NeedsCharging);
    assert_eq!(queue.len(), 1);
    assert_eq!(vehicle.snapshot().open_timers, 1);

    let dequeued = queue.try_dequeue().expect("vehicle should be queued");
    assert_eq!(dequeued.id(), vehicle.id());

    let charge_time = dequeued.begin_charging();
    assert_eq!(charge_time, Duration::from_secs(12));
    assert_eq!(vehicle.state(), VehicleState::Charging);
    assert_eq!(vehicle.snapshot().open_timers, 1);

    thread::sleep(Duration::from_millis(5));
    let charged = dequeued.finish_charging();
    assert!(charged >= Duration::from_millis(5));

    let snapshot = vehicle.snapshot();
    assert_eq!(snapshot.state, VehicleState::Charged);
    assert_eq!(snapshot.open_timers, 0);
    assert_eq!(snapshot.charging, charged);
    assert_eq!(vehicle.close_open_timers(), 0);
}

#[test]
fn test_abandoned_queue_time_is_closed() {
    let queue = ChargingQueue::new();
    let vehicle = Arc::new(Vehicle::new(VehicleId(1), spec("E"), TimeScale::default()));

    vehicle.needs_charged_action(&queue);
    thread::sleep(Duration::from_millis(5));

    for waiting in queue.drain() {
        waiting.abandon_queue();
    }

    let snapshot = vehicle.snapshot();
    assert_eq!(snapshot.open_timers, 0);
    assert!(snapshot.queueing >= Duration::from_millis(5));
    assert_eq!(snapshot.charging, Duration::ZERO);
}

#[test]
fn test_vehicle_enqueues_itself_after_cruising() {
    let queue = Arc::new(ChargingQueue::new());
    let scale = TimeScale::new(Duration::from_millis(1));
    let mut entity = VehicleEntity::new(Vehicle::new(VehicleId(0), spec("A"), scale), Arc::clone(&queue));

    entity.start().expect("start should succeed");
    assert!(wait_until(Duration::from_secs(5), || queue.len() == 1));
    entity.stop();
    entity.join().expect("join should succeed");

    let vehicle = entity.vehicle().expect("entity is a vehicle");
    let snapshot = vehicle.snapshot();
    assert_eq!(snapshot.state, VehicleState::NeedsCharging);
    assert!(snapshot.cruising >= Duration::from_millis(100));
    assert_eq!(snapshot.open_timers, 1, "queueing stays open until a charger closes it");
    assert_eq!(vehicle.close_open_timers(), 1);
}

#[test]
fn test_stop_mid_cruise_is_prompt_and_closes_timer() {
    let queue = Arc::new(ChargingQueue::new());
    let mut entity = VehicleEntity::new(
        Vehicle::new(VehicleId(0), spec("A"), TimeScale::default()),
        Arc::clone(&queue),
    );

    entity.start().expect("start should succeed");
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    entity.stop();
    entity.join().expect("join should succeed");
    assert!(started.elapsed() < Duration::from_secs(1));

    let snapshot = entity.vehicle().expect("entity is a vehicle").snapshot();
    assert_eq!(snapshot.state, VehicleState::Cruising);
    assert_eq!(snapshot.open_timers, 0);
    assert!(snapshot.cruising > Duration::ZERO);
    assert!(snapshot.cruising < Duration::from_secs(1));
    assert!(queue.is_empty());
}

#[test]
fn test_vehicle_entity_rejects_second_start() {
    let queue = Arc::new(ChargingQueue::new());
    let mut entity = VehicleEntity::new(
        Vehicle::new(VehicleId(0), spec("B"), TimeScale::default()),
        queue,
    );

    entity.start().expect("start should succeed");
    assert!(entity.start().is_err());
    entity.stop();
    entity.stop();
    entity.join().expect("join should succeed");
    entity.join().expect("second join should be a no-op");
}
