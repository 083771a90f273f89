//! Spawning and reaping the external simulator.

use std::process::{Child, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{ProcessError, ProcessResult, SumoCommand};

/// Starts the simulator without waiting for it, and tears it down later.
pub trait Launcher {
    fn launch(&mut self, command: &SumoCommand) -> ProcessResult<()>;

    /// Reap the process, killing it if it has not exited within `grace`.
    fn teardown(&mut self, grace: Duration);
}

/// Launches a real child process.
#[derive(Debug, Default)]
pub struct SystemLauncher {
    child: Option<Child>,
}

impl SystemLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// OS process id of the running child, if any.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }
}

const POLL: Duration = Duration::from_millis(50);

impl Launcher for SystemLauncher {
    fn launch(&mut self, command: &SumoCommand) -> ProcessResult<()> {
        let child = command
            .to_command()
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| ProcessError::Spawn { command: command.to_string(), source })?;
        info!(pid = child.id(), %command, "traffic simulator launched");
        self.child = Some(child);
        Ok(())
    }

    fn teardown(&mut self, grace: Duration) {
        let Some(mut child) = self.child.take() else { return };

        let mut waited = Duration::ZERO;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "traffic simulator exited");
                    return;
                }
                Ok(None) if waited < grace => {
                    thread::sleep(POLL);
                    waited += POLL;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "could not poll traffic simulator");
                    break;
                }
            }
        }

        if let Err(e) = child.kill() {
            warn!(error = %e, "could not kill traffic simulator");
        }
        // Reap so no zombie is left behind.
        let _ = child.wait();
        info!("traffic simulator killed");
    }
}

impl Drop for SystemLauncher {
    fn drop(&mut self) {
        self.teardown(Duration::ZERO);
    }
}
