//! `ProcessManager`: the production [`Connector`].

use std::thread;
use std::time::Duration;

use cs_core::{ProcessConfig, SimTime};
use cs_traci::{ControlChannel, TraciClient};
use tracing::{error, info, warn};

use crate::privilege::{effective_uid, require_netns_privilege};
use crate::{
    ConnectPolicy, Launcher, PortCheck, ProcessError, ProcessResult, SumoCommand,
    SystemLauncher, TcpPortCheck, connect_with_retry, find_free_port,
};

/// Opens and closes the control channel.  The step scheduler depends only on
/// this trait, so tests substitute scripted channels.
pub trait Connector {
    type Channel: ControlChannel;

    /// Bring the external simulator up and return a connected channel.
    fn start(&mut self) -> ProcessResult<Self::Channel>;

    /// Close `channel` gracefully and release the process.  Teardown happens
    /// even when the close fails; the close error is returned.
    fn shutdown(&mut self, channel: &mut Self::Channel) -> ProcessResult<()>;
}

/// How long a cleanly closed simulator gets to exit before it is killed.
const EXIT_GRACE: Duration = Duration::from_secs(2);

/// Launches the external simulator and connects to it over TCP.
pub struct ProcessManager<L: Launcher = SystemLauncher, P: PortCheck = TcpPortCheck> {
    config:      ProcessConfig,
    step_length: SimTime,
    launcher:    L,
    ports:       P,
    port:        Option<u16>,
    command:     Option<SumoCommand>,
}

impl ProcessManager {
    pub fn new(config: ProcessConfig, step_length: SimTime) -> Self {
        Self::with_parts(config, step_length, SystemLauncher::new(), TcpPortCheck)
    }
}

impl<L: Launcher, P: PortCheck> ProcessManager<L, P> {
    pub fn with_parts(config: ProcessConfig, step_length: SimTime, launcher: L, ports: P) -> Self {
        Self { config, step_length, launcher, ports, port: None, command: None }
    }

    /// Port selected by the last `start`.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Command line used by the last `start`.
    pub fn command(&self) -> Option<&SumoCommand> {
        self.command.as_ref()
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn launcher_mut(&mut self) -> &mut L {
        &mut self.launcher
    }

    /// Validate, select a port and assemble the command line.  Nothing is
    /// spawned.
    pub fn prepare(&mut self, euid: u32) -> ProcessResult<SumoCommand> {
        self.config.validate()?;
        let netns = self.config.netns.as_deref();
        require_netns_privilege(netns, euid)?;

        let port = find_free_port(&mut self.ports, self.config.port)?;
        let mut command = SumoCommand::build(&self.config, port, self.step_length);
        if let Some(name) = netns {
            info!(netns = name, "simulator runs inside a network namespace");
            command = command.in_netns(name);
        }

        self.port = Some(port);
        self.command = Some(command.clone());
        Ok(command)
    }
}

impl<L: Launcher, P: PortCheck> Connector for ProcessManager<L, P> {
    type Channel = TraciClient;

    fn start(&mut self) -> ProcessResult<TraciClient> {
        let command = self.prepare(effective_uid())?;
        let port = self.port.unwrap_or(self.config.port);

        self.launcher.launch(&command)?;

        let policy = ConnectPolicy::from_config(&self.config);
        let host = self.config.host.clone();
        let connected = connect_with_retry(&policy, port, thread::sleep, |_| {
            TraciClient::connect(&host, port, policy.timeout)
        });

        match connected {
            Ok(client) => {
                info!(%host, port, "control channel ready");
                Ok(client)
            }
            Err(e) => {
                error!(error = %e, "could not connect to traffic simulator");
                self.launcher.teardown(Duration::ZERO);
                Err(e)
            }
        }
    }

    fn shutdown(&mut self, channel: &mut TraciClient) -> ProcessResult<()> {
        let closed = channel.close();
        if let Err(e) = &closed {
            warn!(error = %e, "control channel close failed");
        }
        let grace = if closed.is_ok() { EXIT_GRACE } else { Duration::ZERO };
        self.launcher.teardown(grace);
        closed.map_err(ProcessError::from)
    }
}
