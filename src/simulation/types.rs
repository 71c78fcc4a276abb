//! Core types for the fleet simulation
//!
//! Identifiers, vehicle lifecycle states, the preset vehicle profiles and the
//! mapping between simulated minutes and wall-clock time.

use std::fmt;
use std::time::Duration;

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

/// A wrapper type for charger IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChargerId(pub usize);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChargerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleState {
    /// Created but not yet airborne
    Initial,
    /// Flying on battery
    Cruising,
    /// Battery depleted, waiting in the charging queue
    NeedsCharging,
    /// Occupying a charger
    Charging,
    /// Charge complete, about to cruise again
    Charged,
}

/// Performance profile shared by every vehicle of one type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSpec {
    pub name: &'static str,
    /// Battery capacity (kWh)
    pub battery_capacity: f64,
    /// Cruise speed (mph)
    pub cruise_speed: f64,
    pub passenger_count: u32,
    /// Energy use at cruise (kWh/mile)
    pub energy_use: f64,
    /// Probability of a fault per flight hour
    pub fault_probability: f64,
    /// Time to charge (hours)
    pub time_to_charge: f64,
}

impl VehicleSpec {
    /// Simulated minutes a full battery lasts at cruise speed, truncated
    pub fn cruise_minutes(&self) -> u64 {
        (self.battery_capacity / self.energy_use / self.cruise_speed * MINUTES_PER_HOUR).floor()
            as u64
    }

    /// Simulated minutes needed to recharge, rounded up
    pub fn charge_minutes(&self) -> u64 {
        (self.time_to_charge * MINUTES_PER_HOUR).ceil() as u64
    }
}

pub const MINUTES_PER_HOUR: f64 = 60.0;

/// The preset vehicle profiles, A through E
pub static VEHICLE_SPECS: [VehicleSpec; 5] = [
    VehicleSpec {
        name: "A",
        battery_capacity: 320.0,
        cruise_speed: 120.0,
        passenger_count: 4,
        energy_use: 1.6,
        fault_probability: 0.25,
        time_to_charge: 0.60,
    },
    VehicleSpec {
        name: "B",
        battery_capacity: 100.0,
        cruise_speed: 100.0,
        passenger_count: 5,
        energy_use: 1.5,
        fault_probability: 0.10,
        time_to_charge: 0.20,
    },
    VehicleSpec {
        name: "C",
        battery_capacity: 220.0,
        cruise_speed: 160.0,
        passenger_count: 3,
        energy_use: 2.2,
        fault_probability: 0.05,
        time_to_charge: 0.80,
    },
    VehicleSpec {
        name: "D",
        battery_capacity: 120.0,
        cruise_speed: 90.0,
        passenger_count: 2,
        energy_use: 0.8,
        fault_probability: 0.22,
        time_to_charge: 0.62,
    },
    VehicleSpec {
        name: "E",
        battery_capacity: 150.0,
        cruise_speed: 30.0,
        passenger_count: 2,
        energy_use: 5.8,
        fault_probability: 0.61,
        time_to_charge: 0.30,
    },
];

/// How much wall-clock time one simulated minute takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeScale {
    pub real_per_minute: Duration,
}

impl TimeScale {
    pub fn new(real_per_minute: Duration) -> Self {
        Self { real_per_minute }
    }

    /// Wall-clock duration of `minutes` simulated minutes
    pub fn to_real(&self, minutes: u64) -> Duration {
        self.real_per_minute
            .saturating_mul(u32::try_from(minutes).unwrap_or(u32::MAX))
    }

    /// Simulated minutes covered by a wall-clock duration
    pub fn to_minutes(&self, real: Duration) -> f64 {
        if self.real_per_minute.is_zero() {
            return 0.0;
        }
        real.as_secs_f64() / self.real_per_minute.as_secs_f64()
    }
}

impl Default for TimeScale {
    /// One simulated minute per real second
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Interval at which a waiting entity re-checks shared state
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);
