//! Common lifecycle interface for vehicles and chargers

use std::sync::Arc;

use super::error::SimResult;
use super::vehicle::Vehicle;

/// Something the orchestrator can start, stop, join and report on
pub trait SimEntity {
    /// Header used to identify the entity in logs, e.g. `<Vehicle A3>`
    fn header(&self) -> &str;

    fn start(&mut self) -> SimResult<()>;

    fn stop(&mut self);

    fn join(&mut self) -> SimResult<()>;

    /// Log this entity's statistics
    fn print_stats(&self);

    /// The simulated vehicle, for entities that are vehicles
    fn vehicle(&self) -> Option<&Arc<Vehicle>> {
        None
    }
}
