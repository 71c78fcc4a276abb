//! Concurrent fleet simulation
//!
//! Vehicles and chargers each run on their own thread and meet only through a
//! shared charging queue. The [`Simulation`] orchestrator builds the fleet,
//! runs it for a fixed window and aggregates per-type statistics.

mod charger;
mod entity;
mod error;
mod fleet;
mod queue;
mod stats;
mod stopwatch;
mod types;
mod vehicle;
mod worker;

pub use charger::{Charger, ChargerStats};
pub use entity::SimEntity;
pub use error::{SimError, SimResult};
pub use fleet::{
    Simulation, SimulationConfig, DEFAULT_CHARGERS, DEFAULT_DURATION_SECS, DEFAULT_VEHICLES,
    DEFAULT_VEHICLE_TYPES,
};
pub use queue::LockedQueue;
pub use stats::{FleetReport, TypeStats};
pub use stopwatch::StopWatch;
pub use types::{
    ChargerId, TimeScale, VehicleId, VehicleSpec, VehicleState, MINUTES_PER_HOUR, POLL_INTERVAL,
    VEHICLE_SPECS,
};
pub use vehicle::{ChargingQueue, Vehicle, VehicleEntity, VehicleSnapshot};
pub use worker::{StopToken, WaitOutcome, Worker, WorkerPhase};
