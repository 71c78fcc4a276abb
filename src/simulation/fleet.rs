//! Simulation orchestrator
//!
//! Builds the fleet of vehicles and chargers around one shared charging queue,
//! runs every entity on its own thread for a fixed window, then shuts them all
//! down and turns the vehicles' timers into a [`FleetReport`].

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::charger::Charger;
use super::entity::SimEntity;
use super::error::{SimError, SimResult};
use super::stats::FleetReport;
use super::types::{ChargerId, TimeScale, VehicleId, VEHICLE_SPECS};
use super::vehicle::{ChargingQueue, Vehicle, VehicleEntity, VehicleSnapshot};

/// Default number of vehicles in the fleet
pub const DEFAULT_VEHICLES: usize = 20;
/// Default number of vehicle types drawn from
pub const DEFAULT_VEHICLE_TYPES: usize = 5;
/// Default number of chargers
pub const DEFAULT_CHARGERS: usize = 3;
/// Default run window in real seconds
pub const DEFAULT_DURATION_SECS: u64 = 10;

/// Sizes of the fleet and how fast simulated time runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub vehicles: usize,
    /// Vehicle types are drawn uniformly from the first `vehicle_types` presets
    pub vehicle_types: usize,
    pub chargers: usize,
    pub time_scale: TimeScale,
    /// Seed for reproducible vehicle type assignment
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            vehicles: DEFAULT_VEHICLES,
            vehicle_types: DEFAULT_VEHICLE_TYPES,
            chargers: DEFAULT_CHARGERS,
            time_scale: TimeScale::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(vehicles: usize, vehicle_types: usize, chargers: usize) -> Self {
        Self {
            vehicles,
            vehicle_types,
            chargers,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.vehicles > 0 && self.vehicle_types == 0 {
            return Err(SimError::InvalidConfig(format!(
                "{} vehicles requested but no vehicle types",
                self.vehicles
            )));
        }
        if self.vehicle_types > VEHICLE_SPECS.len() {
            return Err(SimError::InvalidConfig(format!(
                "{} vehicle types requested but only {} exist",
                self.vehicle_types,
                VEHICLE_SPECS.len()
            )));
        }
        Ok(())
    }
}

/// The fleet: every vehicle and charger plus the queue they share
pub struct Simulation {
    config: SimulationConfig,
    queue: Arc<ChargingQueue>,
    entities: Vec<Box<dyn SimEntity>>,
    rng: Option<StdRng>,
    created: bool,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            queue: Arc::new(ChargingQueue::new()),
            entities: Vec::new(),
            rng: config.seed.map(StdRng::seed_from_u64),
            created: false,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn queue(&self) -> &Arc<ChargingQueue> {
        &self.queue
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Vehicles in creation order
    pub fn vehicles(&self) -> impl Iterator<Item = &Arc<Vehicle>> {
        self.entities.iter().filter_map(|entity| entity.vehicle())
    }

    fn random_type_index(&mut self) -> usize {
        let types = self.config.vehicle_types;
        match &mut self.rng {
            Some(rng) => rng.random_range(0..types),
            None => rand::rng().random_range(0..types),
        }
    }

    /// Create the vehicles and chargers
    ///
    /// Vehicles come first so that, at shutdown, every vehicle has stopped
    /// enqueueing before any charger drains the queue.
    /// Returns the total number of entities.
    pub fn create(&mut self) -> SimResult<usize> {
        if self.created {
            return Err(SimError::AlreadyCreated);
        }
        self.created = true;

        let scale = self.config.time_scale;
        for i in 0..self.config.vehicles {
            let spec = &VEHICLE_SPECS[self.random_type_index()];
            let vehicle = Vehicle::new(VehicleId(i), spec, scale);
            self.entities
                .push(Box::new(VehicleEntity::new(vehicle, Arc::clone(&self.queue))));
        }

        for i in 0..self.config.chargers {
            self.entities.push(Box::new(Charger::new(
                ChargerId(i),
                Arc::clone(&self.queue),
                scale,
            )));
        }

        info!(
            "Created {} vehicles and {} chargers",
            self.config.vehicles, self.config.chargers
        );
        Ok(self.entities.len())
    }

    /// Run every entity for `duration`, shut them down and report
    pub fn run(&mut self, duration: Duration) -> SimResult<FleetReport> {
        info!("Starting simulation ...");
        let started_at = Instant::now();

        if let Err(err) = self.start_all() {
            warn!("Aborting simulation: {}", err);
            self.stop_all();
            self.join_all()?;
            return Err(err);
        }

        thread::sleep(duration);

        info!("Stopping simulation ...");
        self.stop_all();
        self.join_all()?;
        info!(
            "Simulation ran for {:.2} seconds",
            started_at.elapsed().as_secs_f64()
        );

        let reclosed: usize = self.vehicles().map(|v| v.close_open_timers()).sum();
        if reclosed > 0 {
            warn!("Closed {} timers left open at shutdown", reclosed);
        }

        info!("Calculating statistics ...");
        for entity in &self.entities {
            entity.print_stats();
        }

        let scale = self.config.time_scale;
        let snapshots: Vec<VehicleSnapshot> = self.vehicles().map(|v| v.snapshot()).collect();
        let report = FleetReport::from_snapshots(&snapshots, scale, scale.to_minutes(duration));

        for t in &report.types {
            info!(
                "Type {}: {} vehicles, cruise {:.1} mins, charge {:.1} mins, queue {:.1} mins, max faults {:.2}",
                t.name,
                t.vehicle_count,
                t.avg_cruise_minutes,
                t.avg_charge_minutes,
                t.avg_queue_minutes,
                t.max_faults
            );
        }

        Ok(report)
    }

    fn start_all(&mut self) -> SimResult<()> {
        for entity in &mut self.entities {
            entity.start()?;
        }
        Ok(())
    }

    /// Ask every entity to stop before joining any of them
    fn stop_all(&mut self) {
        for entity in &mut self.entities {
            entity.stop();
        }
    }

    /// Join every entity, reporting the first failure
    fn join_all(&mut self) -> SimResult<()> {
        let mut first_error = None;
        for entity in &mut self.entities {
            if let Err(err) = entity.join() {
                warn!("{} failed to join: {}", entity.header(), err);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
