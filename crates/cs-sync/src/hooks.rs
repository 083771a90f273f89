//! Per-step hooks.
//!
//! Hooks run before each external advance and may issue extra control
//! commands (e.g. injecting a batch of vehicles every N seconds).  State a
//! hook needs across steps lives either in the hook itself or in the
//! engine-owned [`GroupCounter`].

use cs_core::SimTime;
use cs_traci::ControlChannel;

use crate::SyncResult;

/// Monotonic id source for vehicle groups / batches injected by hooks.
#[derive(Clone, Debug, Default)]
pub struct GroupCounter {
    next: u64,
}

impl GroupCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next group id (0, 1, 2, …).
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids allocated so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

/// What a hook sees of the engine during one tick.
pub struct TickContext<'a> {
    /// 1-based index of the step about to run.
    pub step:       u64,
    /// Absolute external time the step will advance to.
    pub joint_time: SimTime,
    /// Vehicles currently mirrored.
    pub mapped:     usize,
    pub channel:    &'a mut dyn ControlChannel,
    pub groups:     &'a mut GroupCounter,
}

pub trait StepHook {
    /// Called before the external simulator is advanced.  An error is fatal.
    fn before_step(&mut self, ctx: &mut TickContext<'_>) -> SyncResult<()>;
}

impl<F> StepHook for F
where
    F: FnMut(&mut TickContext<'_>) -> SyncResult<()>,
{
    fn before_step(&mut self, ctx: &mut TickContext<'_>) -> SyncResult<()> {
        self(ctx)
    }
}
