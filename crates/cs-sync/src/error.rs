//! Engine error type.

use thiserror::Error;

use cs_core::{CoreError, EntityId};
use cs_process::ProcessError;
use cs_traci::TraciError;
use cs_viz::VizError;

use crate::{EngineState, HostError};

/// Everything that can stop the co-simulation.
///
/// All variants except [`SyncError::State`] are fatal: the scheduler
/// terminates the visualiser and releases the external simulator before
/// returning them.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid configuration, detected before anything was spawned.
    #[error("configuration error: {0}")]
    Config(String),

    /// The external simulator could not be launched or reached.
    #[error("startup failed: {0}")]
    Startup(#[source] ProcessError),

    /// A control-channel exchange failed mid-run.
    #[error("control channel failed: {0}")]
    Channel(#[from] TraciError),

    /// The visualiser rejected an update.
    #[error("visualiser failed: {0}")]
    Sink(#[from] VizError),

    /// The host could not supply a node.
    #[error("host could not include {id}: {source}")]
    Host {
        id:     EntityId,
        #[source]
        source: HostError,
    },

    /// Operation not allowed in the current engine state.
    #[error("`{op}` is not allowed in state {state:?}")]
    State { op: &'static str, state: EngineState },
}

impl SyncError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SyncError::State { .. })
    }
}

impl From<CoreError> for SyncError {
    fn from(e: CoreError) -> Self {
        SyncError::Config(e.to_string())
    }
}

impl From<ProcessError> for SyncError {
    fn from(e: ProcessError) -> Self {
        match e {
            ProcessError::Config(msg) => SyncError::Config(msg),
            ProcessError::Core(e)     => e.into(),
            ProcessError::Traci(e)    => SyncError::Channel(e),
            other                     => SyncError::Startup(other),
        }
    }
}

/// Shorthand result type for `cs-sync`.
pub type SyncResult<T> = Result<T, SyncError>;
