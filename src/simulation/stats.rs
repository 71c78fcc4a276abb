//! Per-vehicle-type statistics aggregated after a run

use std::collections::BTreeMap;
use std::fmt;

use super::types::{TimeScale, MINUTES_PER_HOUR};
use super::vehicle::VehicleSnapshot;

/// Aggregate statistics for all vehicles of one type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeStats {
    pub name: &'static str,
    pub vehicle_count: usize,
    pub avg_cruise_minutes: f64,
    pub avg_charge_minutes: f64,
    pub avg_queue_minutes: f64,
    /// Share of the simulated window spent cruising, in percent
    pub cruise_percent: f64,
    pub charge_percent: f64,
    pub queue_percent: f64,
    /// Upper bound on faults if every vehicle of this type flew the whole window
    pub max_faults: f64,
    /// Passenger count times miles flown, summed over the type
    pub passenger_miles: f64,
}

/// Result of a simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct FleetReport {
    /// Length of the run window in simulated minutes
    pub simulated_minutes: f64,
    /// One entry per vehicle type present, ordered by type name
    pub types: Vec<TypeStats>,
}

#[derive(Default)]
struct TypeTotals {
    count: usize,
    cruise_minutes: f64,
    charge_minutes: f64,
    queue_minutes: f64,
    passenger_miles: f64,
    fault_probability: f64,
}

impl FleetReport {
    /// Group vehicle snapshots by type and compute averages over a window of
    /// `simulated_minutes`
    pub fn from_snapshots(
        snapshots: &[VehicleSnapshot],
        scale: TimeScale,
        simulated_minutes: f64,
    ) -> Self {
        let mut totals: BTreeMap<&'static str, TypeTotals> = BTreeMap::new();

        for snapshot in snapshots {
            let cruise_minutes = scale.to_minutes(snapshot.cruising);
            let entry = totals.entry(snapshot.spec.name).or_default();
            entry.count += 1;
            entry.cruise_minutes += cruise_minutes;
            entry.charge_minutes += scale.to_minutes(snapshot.charging);
            entry.queue_minutes += scale.to_minutes(snapshot.queueing);
            entry.passenger_miles += f64::from(snapshot.spec.passenger_count)
                * snapshot.spec.cruise_speed
                * cruise_minutes
                / MINUTES_PER_HOUR;
            entry.fault_probability = snapshot.spec.fault_probability;
        }

        let simulated_hours = simulated_minutes / MINUTES_PER_HOUR;
        let percent_of_window = |minutes: f64| {
            if simulated_minutes > 0.0 {
                minutes / simulated_minutes * 100.0
            } else {
                0.0
            }
        };

        let types = totals
            .into_iter()
            .map(|(name, totals)| {
                let count = totals.count as f64;
                let avg_cruise_minutes = totals.cruise_minutes / count;
                let avg_charge_minutes = totals.charge_minutes / count;
                let avg_queue_minutes = totals.queue_minutes / count;
                TypeStats {
                    name,
                    vehicle_count: totals.count,
                    avg_cruise_minutes,
                    avg_charge_minutes,
                    avg_queue_minutes,
                    cruise_percent: percent_of_window(avg_cruise_minutes),
                    charge_percent: percent_of_window(avg_charge_minutes),
                    queue_percent: percent_of_window(avg_queue_minutes),
                    max_faults: totals.fault_probability * simulated_hours * count,
                    passenger_miles: totals.passenger_miles,
                }
            })
            .collect();

        Self {
            simulated_minutes,
            types,
        }
    }

    pub fn vehicle_count(&self) -> usize {
        self.types.iter().map(|t| t.vehicle_count).sum()
    }

    pub fn get(&self, name: &str) -> Option<&TypeStats> {
        self.types.iter().find(|t| t.name == name)
    }
}

impl fmt::Display for FleetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Fleet Simulation Report ===")?;
        writeln!(f, "Simulated time: {:.1} mins", self.simulated_minutes)?;
        writeln!(
            f,
            "{:<5} {:>5} {:>12} {:>12} {:>12} {:>8} {:>8} {:>8} {:>10} {:>12}",
            "Type",
            "Count",
            "Cruise(min)",
            "Charge(min)",
            "Queue(min)",
            "Cruise%",
            "Charge%",
            "Queue%",
            "MaxFaults",
            "PassMiles",
        )?;
        for t in &self.types {
            writeln!(
                f,
                "{:<5} {:>5} {:>12.1} {:>12.1} {:>12.1} {:>7.1}% {:>7.1}% {:>7.1}% {:>10.2} {:>12.1}",
                t.name,
                t.vehicle_count,
                t.avg_cruise_minutes,
                t.avg_charge_minutes,
                t.avg_queue_minutes,
                t.cruise_percent,
                t.charge_percent,
                t.queue_percent,
                t.max_faults,
                t.passenger_miles,
            )?;
        }
        Ok(())
    }
}
