//! Charger logic for the fleet simulation
//!
//! A charger is the consumer side of the charging queue. It takes one vehicle
//! at a time, holds it for the vehicle's charge duration and releases it.

use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::entity::SimEntity;
use super::error::SimResult;
use super::types::{ChargerId, TimeScale, POLL_INTERVAL};
use super::vehicle::ChargingQueue;
use super::worker::{StopToken, Worker};

/// Running totals kept by a charger thread
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChargerStats {
    /// Charging sessions started, including ones cut short by shutdown
    pub sessions: u32,
    /// Time spent with a vehicle connected
    pub busy: Duration,
    /// Vehicles whose queueing timer was closed during the shutdown drain
    pub drained: u32,
}

/// A charger serving the shared charging queue on its own thread
#[derive(Debug)]
pub struct Charger {
    id: ChargerId,
    header: String,
    scale: TimeScale,
    queue: Arc<ChargingQueue>,
    stats: Arc<Mutex<ChargerStats>>,
    worker: Worker,
}

impl Charger {
    pub fn new(id: ChargerId, queue: Arc<ChargingQueue>, scale: TimeScale) -> Self {
        let header = format!("<Charger {}>", id);
        Self {
            id,
            worker: Worker::new(header.clone()),
            header,
            scale,
            queue,
            stats: Arc::new(Mutex::new(ChargerStats::default())),
        }
    }

    pub fn id(&self) -> ChargerId {
        self.id
    }

    pub fn stats(&self) -> ChargerStats {
        *self.stats.lock()
    }

    /// Thread body: charge vehicles until stopped, then close out the queue
    fn run(
        header: String,
        queue: Arc<ChargingQueue>,
        stats: Arc<Mutex<ChargerStats>>,
        token: StopToken,
    ) {
        debug!("{} Running...", header);

        while token.is_running() {
            let Some(vehicle) = queue.dequeue_timeout(POLL_INTERVAL) else {
                continue;
            };

            let charge_time = vehicle.begin_charging();
            debug!(
                "{} Charging {} for {} mins",
                header,
                vehicle.header(),
                vehicle.spec().charge_minutes()
            );

            let outcome = token.wait_for(charge_time);
            let busy = vehicle.finish_charging();

            {
                let mut stats = stats.lock();
                stats.sessions += 1;
                stats.busy += busy;
            }

            if outcome.is_cancelled() {
                debug!("{} Charging of {} interrupted", header, vehicle.header());
            } else {
                debug!("{} Charged {}", header, vehicle.header());
            }
        }

        // Vehicles still waiting at shutdown must not keep an open queueing timer
        let waiting = queue.drain();
        for vehicle in &waiting {
            vehicle.abandon_queue();
        }
        if !waiting.is_empty() {
            debug!("{} Closed queue time for {} vehicles", header, waiting.len());
        }
        let drained = u32::try_from(waiting.len()).unwrap_or(u32::MAX);
        let mut stats = stats.lock();
        stats.drained = stats.drained.saturating_add(drained);
    }
}

impl SimEntity for Charger {
    fn header(&self) -> &str {
        &self.header
    }

    fn start(&mut self) -> SimResult<()> {
        let header = self.header.clone();
        let queue = Arc::clone(&self.queue);
        let stats = Arc::clone(&self.stats);
        self.worker
            .start(move |token| Charger::run(header, queue, stats, token))
    }

    fn stop(&mut self) {
        self.worker.stop();
    }

    fn join(&mut self) -> SimResult<()> {
        self.worker.join()
    }

    fn print_stats(&self) {
        let stats = self.stats();
        info!(
            "{} Sessions: {}, Busy: {:.1} mins, Drained: {}",
            self.header,
            stats.sessions,
            self.scale.to_minutes(stats.busy),
            stats.drained,
        );
    }
}
