//! Simulation time model.
//!
//! # Design
//!
//! Simulated time is an integer millisecond count, [`SimTime`].  Joint step
//! times are computed as
//!
//!   joint_time = local_now + interval + start_offset
//!
//! and integer arithmetic keeps every joint time an exact multiple of the
//! interval away from the start offset (no floating-point drift over long
//! runs).  Seconds as `f64` appear only at the wire boundary, where the
//! external simulator expects them.

use std::fmt;
use std::time::Duration;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute (or relative) simulated time in milliseconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    #[inline]
    pub fn from_millis(ms: u64) -> Self {
        SimTime(ms)
    }

    #[inline]
    pub fn from_secs(secs: u64) -> Self {
        SimTime(secs.saturating_mul(1_000))
    }

    /// Convert from float seconds, rounding to the nearest millisecond.
    /// Negative and non-finite inputs clamp to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return SimTime::ZERO;
        }
        SimTime((secs * 1_000.0).round() as u64)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    #[inline]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `self + rhs`, or `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: SimTime) -> Option<SimTime> {
        self.0.checked_add(rhs.0).map(SimTime)
    }

    /// Time `self - earlier`, saturating at zero.
    #[inline]
    pub fn saturating_since(self, earlier: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(earlier.0))
    }
}

/// Saturates at `u64::MAX` ms.
impl std::ops::Add for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign for SimTime {
    #[inline]
    fn add_assign(&mut self, rhs: SimTime) {
        *self = *self + rhs;
    }
}

impl std::ops::Mul<u64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn mul(self, rhs: u64) -> SimTime {
        SimTime(self.0.saturating_mul(rhs))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1_000, self.0 % 1_000)
    }
}

// ── StepClock ─────────────────────────────────────────────────────────────────

/// Joint-step counter shared by the two simulators.
///
/// `steps` counts completed joint steps *after* the initial advance to the
/// start offset.  Step `k` fires at local time `k * interval` and advances
/// the external simulator to `(k + 1) * interval + start_offset`, so the
/// external clock leads the local one by one interval.
#[derive(Clone, Debug)]
pub struct StepClock {
    /// Length of one joint step.
    pub interval: SimTime,
    /// Offset between local time zero and the external simulator's time.
    pub start_offset: SimTime,
    steps: u64,
    last_joint: Option<SimTime>,
}

impl StepClock {
    pub fn new(interval: SimTime, start_offset: SimTime) -> Self {
        Self {
            interval,
            start_offset,
            steps: 0,
            last_joint: None,
        }
    }

    /// Number of joint steps completed since setup.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The absolute external time reached by the most recent advance, if any.
    #[inline]
    pub fn last_joint_time(&self) -> Option<SimTime> {
        self.last_joint
    }

    /// Absolute external time for the joint step following local time `now`,
    /// or `None` if it is not representable.
    #[inline]
    pub fn next_joint_time(&self, local_now: SimTime) -> Option<SimTime> {
        local_now.checked_add(self.interval)?.checked_add(self.start_offset)
    }

    /// Record the initial advance to the start offset.
    pub fn mark_started(&mut self) {
        self.last_joint = Some(self.start_offset);
    }

    /// Record a completed joint step that reached `joint_time`.
    pub fn mark_step(&mut self, joint_time: SimTime) {
        self.steps += 1;
        self.last_joint = Some(joint_time);
    }
}

impl fmt::Display for StepClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_joint {
            Some(t) => write!(f, "step {} @ {}", self.steps, t),
            None    => write!(f, "step {} (not started)", self.steps),
        }
    }
}
