//! Vehicle state machine
//!
//! Each vehicle runs on its own thread, cruising until its battery is empty,
//! queueing for a charger, and cruising again once a charger is done with it.
//! A charger takes over the vehicle's timers and state between dequeue and
//! release; at no point do two threads work on the same vehicle concurrently.

use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::entity::SimEntity;
use super::error::SimResult;
use super::queue::LockedQueue;
use super::stopwatch::StopWatch;
use super::types::{TimeScale, VehicleId, VehicleSpec, VehicleState, POLL_INTERVAL};
use super::worker::{StopToken, WaitOutcome, Worker};

/// Queue of vehicles waiting for a charger
pub type ChargingQueue = LockedQueue<Arc<Vehicle>>;

#[derive(Debug)]
struct VehicleStatus {
    state: VehicleState,
    cruising: StopWatch,
    charging: StopWatch,
    queueing: StopWatch,
}

/// A simulated vehicle, shared between its own thread and the charger serving it
#[derive(Debug)]
pub struct Vehicle {
    id: VehicleId,
    spec: &'static VehicleSpec,
    scale: TimeScale,
    header: String,
    status: Mutex<VehicleStatus>,
}

/// Point-in-time copy of a vehicle's timers
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub spec: &'static VehicleSpec,
    pub state: VehicleState,
    pub cruising: Duration,
    pub charging: Duration,
    pub queueing: Duration,
    /// Completed cruise legs
    pub cruise_legs: u32,
    /// Completed charging sessions
    pub charge_sessions: u32,
    /// Number of timers still open
    pub open_timers: usize,
}

impl Vehicle {
    pub fn new(id: VehicleId, spec: &'static VehicleSpec, scale: TimeScale) -> Self {
        Self {
            id,
            spec,
            scale,
            header: format!("<Vehicle {}{}>", spec.name, id),
            status: Mutex::new(VehicleStatus {
                state: VehicleState::Initial,
                cruising: StopWatch::new(),
                charging: StopWatch::new(),
                queueing: StopWatch::new(),
            }),
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn spec(&self) -> &'static VehicleSpec {
        self.spec
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn state(&self) -> VehicleState {
        self.status.lock().state
    }

    fn set_state(&self, state: VehicleState) {
        self.status.lock().state = state;
    }

    /// Wall-clock time a full battery lasts
    pub fn cruise_time(&self) -> Duration {
        self.scale.to_real(self.spec.cruise_minutes())
    }

    /// Wall-clock time a full recharge takes
    pub fn charge_time(&self) -> Duration {
        self.scale.to_real(self.spec.charge_minutes())
    }

    /// Fly until the battery is empty or the worker is stopped
    ///
    /// The cruising timer covers exactly the part of the flight that happened.
    pub fn cruise_action(&self, token: &StopToken) -> WaitOutcome {
        debug!("{} Cruising for {} mins", self.header, self.spec.cruise_minutes());

        self.status.lock().cruising.start();
        let outcome = token.wait_for(self.cruise_time());
        self.status.lock().cruising.stop();

        outcome
    }

    /// Join the back of the charging queue
    pub fn needs_charged_action(self: &Arc<Self>, queue: &ChargingQueue) {
        {
            let mut status = self.status.lock();
            status.state = VehicleState::NeedsCharging;
            status.queueing.start();
        }
        debug!("{} Waiting for a charger", self.header);
        queue.enqueue(Arc::clone(self));
    }

    /// Called by a charger right after dequeueing this vehicle
    ///
    /// Ends queueing, starts charging, and returns how long the charge takes.
    pub fn begin_charging(&self) -> Duration {
        let mut status = self.status.lock();
        status.state = VehicleState::Charging;
        status.queueing.stop();
        status.charging.start();
        drop(status);
        self.charge_time()
    }

    /// Called by a charger when it releases this vehicle
    ///
    /// Returns the length of the charging interval just closed.
    pub fn finish_charging(&self) -> Duration {
        let mut status = self.status.lock();
        let charged = status.charging.stop().unwrap_or_default();
        status.state = VehicleState::Charged;
        charged
    }

    /// Called for a vehicle still queued when the simulation ends
    pub fn abandon_queue(&self) {
        self.status.lock().queueing.stop();
    }

    /// Close whatever timers are still open; returns how many were
    pub fn close_open_timers(&self) -> usize {
        let mut status = self.status.lock();
        [
            status.cruising.stop(),
            status.charging.stop(),
            status.queueing.stop(),
        ]
        .iter()
        .filter(|closed| closed.is_some())
        .count()
    }

    pub fn snapshot(&self) -> VehicleSnapshot {
        let status = self.status.lock();
        let open_timers = [&status.cruising, &status.charging, &status.queueing]
            .iter()
            .filter(|watch| watch.is_running())
            .count();

        VehicleSnapshot {
            id: self.id,
            spec: self.spec,
            state: status.state,
            cruising: status.cruising.total(),
            charging: status.charging.total(),
            queueing: status.queueing.total(),
            cruise_legs: status.cruising.intervals(),
            charge_sessions: status.charging.intervals(),
            open_timers,
        }
    }

    /// Thread body: drives the vehicle through its states until stopped
    fn run(self: Arc<Self>, queue: Arc<ChargingQueue>, token: StopToken) {
        debug!("{} Running...", self.header);

        while token.is_running() {
            match self.state() {
                VehicleState::Initial | VehicleState::Charged => {
                    self.set_state(VehicleState::Cruising);
                }
                VehicleState::Cruising => {
                    if self.cruise_action(&token).is_cancelled() {
                        break;
                    }
                    self.needs_charged_action(&queue);
                }
                VehicleState::NeedsCharging | VehicleState::Charging => {
                    token.wait_for(POLL_INTERVAL);
                }
            }
        }

        debug!("{} Stopped in state {:?}", self.header, self.state());
    }
}

/// Worker thread driving one [`Vehicle`]
#[derive(Debug)]
pub struct VehicleEntity {
    vehicle: Arc<Vehicle>,
    queue: Arc<ChargingQueue>,
    worker: Worker,
}

impl VehicleEntity {
    pub fn new(vehicle: Vehicle, queue: Arc<ChargingQueue>) -> Self {
        let worker = Worker::new(vehicle.header());
        Self {
            vehicle: Arc::new(vehicle),
            queue,
            worker,
        }
    }
}

impl SimEntity for VehicleEntity {
    fn header(&self) -> &str {
        self.vehicle.header()
    }

    fn start(&mut self) -> SimResult<()> {
        let vehicle = Arc::clone(&self.vehicle);
        let queue = Arc::clone(&self.queue);
        self.worker.start(move |token| vehicle.run(queue, token))
    }

    fn stop(&mut self) {
        self.worker.stop();
    }

    fn join(&mut self) -> SimResult<()> {
        self.worker.join()
    }

    fn print_stats(&self) {
        let snapshot = self.vehicle.snapshot();
        let scale = self.vehicle.scale;
        info!(
            "{} Cruising: {:.1} mins, Charging: {:.1} mins, Queueing: {:.1} mins",
            self.vehicle.header,
            scale.to_minutes(snapshot.cruising),
            scale.to_minutes(snapshot.charging),
            scale.to_minutes(snapshot.queueing),
        );
    }

    fn vehicle(&self) -> Option<&Arc<Vehicle>> {
        Some(&self.vehicle)
    }
}
