//! Error type for the fleet simulation

use thiserror::Error;

/// Usage and runtime errors raised by simulation entities and the orchestrator
#[derive(Debug, Error)]
pub enum SimError {
    #[error("{0} was already started")]
    AlreadyStarted(String),

    #[error("failed to spawn thread for {entity}: {source}")]
    Spawn {
        entity: String,
        #[source]
        source: std::io::Error,
    },

    #[error("thread for {0} panicked")]
    WorkerPanicked(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("simulation entities were already created")]
    AlreadyCreated,
}

/// Shorthand result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;
