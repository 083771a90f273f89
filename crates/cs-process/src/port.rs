//! Control-port selection.

use std::net::{Ipv4Addr, TcpListener};

use tracing::debug;

use crate::{ProcessError, ProcessResult};

/// Checks whether a TCP port can currently be bound.
pub trait PortCheck {
    fn is_free(&mut self, port: u16) -> bool;
}

/// Binds a listener on all interfaces and drops it immediately.
#[derive(Copy, Clone, Debug, Default)]
pub struct TcpPortCheck;

impl PortCheck for TcpPortCheck {
    fn is_free(&mut self, port: u16) -> bool {
        TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).is_ok()
    }
}

/// First free port at or above `preferred`.  Each candidate is tried once.
pub fn find_free_port<P: PortCheck + ?Sized>(ports: &mut P, preferred: u16) -> ProcessResult<u16> {
    for port in preferred..=u16::MAX {
        if ports.is_free(port) {
            return Ok(port);
        }
        debug!(port, "control port busy");
    }
    Err(ProcessError::PortsExhausted { from: preferred })
}
