//! Root check for network-namespace launches.

use nix::unistd::geteuid;

use crate::{ProcessError, ProcessResult};

/// Effective user id of this process.
pub fn effective_uid() -> u32 {
    geteuid().as_raw()
}

/// Entering a network namespace through `ip netns exec` needs root.
pub fn require_netns_privilege(netns: Option<&str>, euid: u32) -> ProcessResult<()> {
    match netns {
        Some(name) if euid != 0 => Err(ProcessError::Config(format!(
            "launching inside network namespace `{name}` requires root privileges or sudo"
        ))),
        _ => Ok(()),
    }
}
