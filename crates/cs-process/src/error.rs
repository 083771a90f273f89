use thiserror::Error;

use cs_core::CoreError;
use cs_traci::TraciError;

/// Errors raised while starting or stopping the external simulator.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Rejected before anything was spawned.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no free control port in {from}..=65535")]
    PortsExhausted { from: u16 },

    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source:  std::io::Error,
    },

    /// The simulator never accepted a control connection.
    #[error("simulator on port {port} not ready after {attempts} attempts: {source}")]
    NotReady {
        port:     u16,
        attempts: u32,
        #[source]
        source:   TraciError,
    },

    #[error(transparent)]
    Traci(#[from] TraciError),
}

pub type ProcessResult<T> = Result<T, ProcessError>;
