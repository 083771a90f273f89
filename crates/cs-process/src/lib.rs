//! `cs-process`: external simulator process and connection management.
//!
//! Startup sequence of [`ProcessManager::start`]:
//!
//! 1. validate the [`ProcessConfig`][cs_core::ProcessConfig];
//! 2. pick a free control port ([`find_free_port`]);
//! 3. build the command line ([`SumoCommand`]), optionally wrapped in a
//!    network namespace;
//! 4. spawn it through a [`Launcher`];
//! 5. wait the grace period, then connect with bounded retries
//!    ([`connect_with_retry`]).
//!
//! The step scheduler only sees the [`Connector`] trait.

pub mod command;
pub mod connect;
pub mod error;
pub mod launch;
pub mod manager;
pub mod port;
pub mod privilege;

#[cfg(test)]
mod tests;

pub use command::SumoCommand;
pub use connect::{ConnectPolicy, connect_with_retry};
pub use error::{ProcessError, ProcessResult};
pub use launch::{Launcher, SystemLauncher};
pub use manager::{Connector, ProcessManager};
pub use port::{PortCheck, TcpPortCheck, find_free_port};
