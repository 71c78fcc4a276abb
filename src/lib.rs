//! Fleet Simulation Library
//!
//! A thread-per-entity simulation of vehicles sharing a small pool of chargers.

pub mod simulation;
