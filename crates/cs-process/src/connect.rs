//! Readiness: grace period, then bounded connect retries with exponential
//! backoff.

use std::time::Duration;

use cs_core::ProcessConfig;
use cs_traci::TraciResult;
use tracing::{debug, warn};

use crate::{ProcessError, ProcessResult};

/// How long to wait for the simulator to open its control socket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConnectPolicy {
    /// Sleep between spawning and the first attempt.
    pub grace:           Duration,
    pub attempts:        u32,
    pub initial_backoff: Duration,
    pub max_backoff:     Duration,
    /// Per-attempt TCP connect timeout.
    pub timeout:         Duration,
}

impl ConnectPolicy {
    pub fn from_config(config: &ProcessConfig) -> Self {
        Self {
            grace:           config.wait_for_socket(),
            attempts:        config.connect.attempts.max(1),
            initial_backoff: Duration::from_millis(config.connect.initial_backoff_ms),
            max_backoff:     Duration::from_millis(config.connect.max_backoff_ms),
            timeout:         Duration::from_millis(config.connect.timeout_ms),
        }
    }

    /// Delay after the `failed`-th failed attempt (1-based).
    pub fn backoff(&self, failed: u32) -> Duration {
        let factor = 1u32.checked_shl(failed.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

/// Sleep for the grace period, then call `attempt` until it succeeds or the
/// policy's attempt budget is spent.
///
/// `attempt` receives the 1-based attempt number.  `sleep` is injected so
/// tests can observe the schedule without waiting.
pub fn connect_with_retry<C>(
    policy:      &ConnectPolicy,
    port:        u16,
    mut sleep:   impl FnMut(Duration),
    mut attempt: impl FnMut(u32) -> TraciResult<C>,
) -> ProcessResult<C> {
    if !policy.grace.is_zero() {
        debug!(grace = ?policy.grace, "waiting for control socket");
        sleep(policy.grace);
    }

    let attempts = policy.attempts.max(1);
    let mut n = 1;
    loop {
        match attempt(n) {
            Ok(channel) => return Ok(channel),
            Err(source) if n >= attempts => {
                return Err(ProcessError::NotReady { port, attempts, source });
            }
            Err(e) => {
                let delay = policy.backoff(n);
                warn!(port, attempt = n, of = attempts, retry_in = ?delay, error = %e, "simulator not ready");
                sleep(delay);
                n += 1;
            }
        }
    }
}
