//! Engine observer trait for progress reporting and data collection.

use cs_core::SimTime;
use tracing::{debug, info};

use crate::Reconciliation;

/// Summary of one setup or joint step, passed to observers.
#[derive(Clone, Copy, Debug)]
pub struct StepReport<'a> {
    /// 0 for setup, then 1, 2, …
    pub step:           u64,
    /// External simulator time reached.
    pub joint_time:     SimTime,
    pub reconciliation: &'a Reconciliation,
    /// Mapped vehicles after the step.
    pub mapped:         usize,
}

/// Callbacks invoked by [`CoSimulation`][crate::CoSimulation].  All methods
/// default to no-ops.
pub trait EngineObserver {
    /// After the initial advance, reconcile and refresh.
    fn on_setup(&mut self, _report: &StepReport<'_>) {}

    /// After every joint step.
    fn on_step(&mut self, _report: &StepReport<'_>) {}

    /// Once, after the engine stopped.
    fn on_stop(&mut self, _steps: u64) {}
}

/// An [`EngineObserver`] that does nothing.
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}

/// Logs lifecycle events at `info` and every step at `debug`.
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn on_setup(&mut self, r: &StepReport<'_>) {
        info!(joint_time = %r.joint_time, mapped = r.mapped, "co-simulation set up");
    }

    fn on_step(&mut self, r: &StepReport<'_>) {
        debug!(
            step = r.step,
            joint_time = %r.joint_time,
            included = r.reconciliation.included.len(),
            excluded = r.reconciliation.excluded.len(),
            mapped = r.mapped,
            "joint step"
        );
    }

    fn on_stop(&mut self, steps: u64) {
        info!(steps, "co-simulation stopped");
    }
}

impl<A: EngineObserver, B: EngineObserver> EngineObserver for (A, B) {
    fn on_setup(&mut self, r: &StepReport<'_>) {
        self.0.on_setup(r);
        self.1.on_setup(r);
    }
    fn on_step(&mut self, r: &StepReport<'_>) {
        self.0.on_step(r);
        self.1.on_step(r);
    }
    fn on_stop(&mut self, steps: u64) {
        self.0.on_stop(steps);
        self.1.on_stop(steps);
    }
}
