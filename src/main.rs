use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

use fleet_sim::simulation::{
    Simulation, SimulationConfig, TimeScale, DEFAULT_CHARGERS, DEFAULT_DURATION_SECS,
    DEFAULT_VEHICLES, DEFAULT_VEHICLE_TYPES,
};

#[derive(Parser)]
#[command(name = "fleet_sim")]
#[command(about = "Vehicle fleet and charger contention simulation")]
struct Cli {
    /// Number of vehicles in the fleet
    #[arg(long, default_value_t = DEFAULT_VEHICLES)]
    vehicles: usize,

    /// Number of vehicle types to draw from (1-5)
    #[arg(long, default_value_t = DEFAULT_VEHICLE_TYPES)]
    vehicle_types: usize,

    /// Number of chargers shared by the fleet
    #[arg(long, default_value_t = DEFAULT_CHARGERS)]
    chargers: usize,

    /// Length of the run in real seconds
    #[arg(long, default_value_t = DEFAULT_DURATION_SECS)]
    duration: u64,

    /// Real milliseconds per simulated minute
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    minute_ms: u64,

    /// Seed for reproducible vehicle type assignment
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("fleet_sim=info"))
        .init();

    let cli = Cli::parse();

    let config = SimulationConfig {
        vehicles: cli.vehicles,
        vehicle_types: cli.vehicle_types,
        chargers: cli.chargers,
        time_scale: TimeScale::new(Duration::from_millis(cli.minute_ms)),
        seed: cli.seed,
    };

    println!("Running fleet simulation...");
    println!(
        "Vehicles: {}, Types: {}, Chargers: {}, Duration: {}s",
        config.vehicles, config.vehicle_types, config.chargers, cli.duration
    );
    println!();

    let mut simulation = Simulation::new(config).context("Invalid simulation configuration")?;
    simulation
        .create()
        .context("Failed to create simulation entities")?;
    let report = simulation
        .run(Duration::from_secs(cli.duration))
        .context("Simulation run failed")?;

    println!("{}", report);
    Ok(())
}
