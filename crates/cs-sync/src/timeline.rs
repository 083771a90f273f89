//! Local discrete-event timeline with optional wall-clock pacing.
//!
//! Events are ordered by `(time, insertion sequence)`, so events scheduled
//! for the same instant fire in the order they were scheduled.  Before an
//! event fires, the timeline's [`Clock`] is asked to synchronise with the
//! event's time: [`NoClock`] returns at once, [`SystemClock`] sleeps until
//! wall-clock elapsed time has caught up with simulated elapsed time.

use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};

use cs_core::SimTime;
use tracing::trace;

/// An entry on the timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<H> {
    /// Run the next joint step.
    JointStep,
    /// Deliver to the host's `on_event`.
    Host(H),
}

/// Outcome of a clock synchronisation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    Synchronized,
    /// Wall-clock time was already past the deadline by this much.
    OutOfSync(Duration),
}

/// Binds simulated time to some notion of wall-clock time.
pub trait Clock {
    /// Block until `deadline` may be processed.
    fn synchronize(&mut self, deadline: SimTime) -> SyncStatus;

    /// Bind simulated time `now` to the present wall-clock instant.
    fn anchor(&mut self, _now: SimTime) {}
}

/// Runs as fast as possible.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoClock;

impl Clock for NoClock {
    fn synchronize(&mut self, _deadline: SimTime) -> SyncStatus {
        SyncStatus::Synchronized
    }
}

/// Real-time pacing.
///
/// Deadlines are measured from the anchor set by [`Clock::anchor`] (or
/// [`SystemClock::anchored`]).  An unanchored clock anchors on its first
/// synchronisation.
#[derive(Clone, Debug, Default)]
pub struct SystemClock {
    anchor: Option<(SimTime, Instant)>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor `sim` to the wall-clock instant `wall`.
    pub fn anchored(sim: SimTime, wall: Instant) -> Self {
        Self { anchor: Some((sim, wall)) }
    }
}

impl Clock for SystemClock {
    fn anchor(&mut self, now: SimTime) {
        if self.anchor.is_none() {
            self.anchor = Some((now, Instant::now()));
        }
    }

    fn synchronize(&mut self, deadline: SimTime) -> SyncStatus {
        let (sim_ref, wall_ref) = *self.anchor.get_or_insert_with(|| (deadline, Instant::now()));
        let target = wall_ref + deadline.saturating_since(sim_ref).as_duration();
        let now = Instant::now();
        if target >= now {
            thread::sleep(target - now);
            SyncStatus::Synchronized
        } else {
            SyncStatus::OutOfSync(now - target)
        }
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// Priority queue of events keyed by simulated time.
pub struct Timeline<H, K: Clock = NoClock> {
    queue: BTreeMap<(SimTime, u64), Event<H>>,
    seq:   u64,
    now:   SimTime,
    clock: K,
}

impl<H> Default for Timeline<H, NoClock> {
    fn default() -> Self {
        Self::new(NoClock)
    }
}

impl<H, K: Clock> Timeline<H, K> {
    pub fn new(clock: K) -> Self {
        Self { queue: BTreeMap::new(), seq: 0, now: SimTime::ZERO, clock }
    }

    /// Current local simulated time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule `event` at absolute time `at`.  Times in the past are
    /// clamped to now.
    pub fn schedule_at(&mut self, at: SimTime, event: Event<H>) {
        let at = at.max(self.now);
        self.queue.insert((at, self.seq), event);
        self.seq += 1;
    }

    /// Schedule `event` `delay` after now.
    pub fn schedule_in(&mut self, delay: SimTime, event: Event<H>) {
        self.schedule_at(self.now + delay, event);
    }

    /// Time of the earliest pending event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.queue.keys().next().map(|&(t, _)| t)
    }

    /// Pop the earliest event if it is due at or before `until`, pacing
    /// through the clock and advancing `now` to its time.
    pub fn pop_until(&mut self, until: SimTime) -> Option<(SimTime, Event<H>)> {
        let entry = self.queue.first_entry()?;
        let (time, _) = *entry.key();
        if time > until {
            return None;
        }
        let event = entry.remove();
        if let SyncStatus::OutOfSync(lag) = self.clock.synchronize(time) {
            trace!(%time, ?lag, "timeline behind wall clock");
        }
        self.now = time;
        Some((time, event))
    }

    /// Anchor the clock at the current simulated time.
    pub fn anchor_clock(&mut self) {
        self.clock.anchor(self.now);
    }

    /// Drop every pending event.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Advance `now` without firing anything (end of a bounded run).
    pub fn advance_to(&mut self, t: SimTime) {
        if t > self.now {
            self.now = t;
        }
    }
}
