//! `StepScheduler`: drives the joint-step loop.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──setup──▶ Ready ──tick──▶ Ticking ──tick──▶ Ticking
//!        │                   │                 │
//!        └───────────────────┴──── stop ───────┴──────────▶ Stopped
//! ```
//!
//! Any fatal error also moves the engine to `Stopped`, after the visualiser
//! has been terminated and the external simulator released.  Calling
//! `setup` twice, `tick` outside `Ready`/`Ticking`, or a `tick` whose joint
//! time does not advance (or overflows) is a [`SyncError::State`] and
//! changes nothing.
//!
//! # One tick
//!
//! 1. `joint = local_now + interval + start_offset`
//! 2. step hooks
//! 3. advance the external simulator to `joint`
//! 4. reconcile arrivals / departures
//! 5. refresh node positions
//!
//! A refresh failure does not undo step 4.

use cs_core::{SimTime, StepClock, UnitDraw};
use cs_process::Connector;
use cs_traci::ControlChannel;
use cs_viz::VisualizerSink;
use tracing::{debug, error, info, warn};

use crate::{
    EntityNodeMap, GroupCounter, NodeHost, Reconciler, Reconciliation, SamplingPolicy,
    StateMirror, StepHook, StepReport, SyncError, SyncResult, TickContext,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Ready,
    Ticking,
    Stopped,
}

/// Result of `setup` or one `tick`.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// 0 for setup.
    pub step:           u64,
    pub joint_time:     SimTime,
    pub reconciliation: Reconciliation,
    /// Nodes whose state was refreshed.
    pub refreshed:      usize,
    /// Mapped vehicles after the step.
    pub mapped:         usize,
}

impl StepOutcome {
    pub fn report(&self) -> StepReport<'_> {
        StepReport {
            step:           self.step,
            joint_time:     self.joint_time,
            reconciliation: &self.reconciliation,
            mapped:         self.mapped,
        }
    }
}

/// The synchronisation engine.
///
/// Create via [`SchedulerBuilder`][crate::SchedulerBuilder].
pub struct StepScheduler<K, H, V, D>
where
    K: Connector,
    H: NodeHost,
    V: VisualizerSink,
    D: UnitDraw,
{
    pub(crate) connector:  K,
    pub(crate) channel:    Option<K::Channel>,
    pub(crate) host:       Option<H>,
    pub(crate) viz:        V,
    pub(crate) mapping:    EntityNodeMap<H::Node>,
    pub(crate) sampling:   SamplingPolicy<D>,
    pub(crate) reconciler: Reconciler,
    pub(crate) mirror:     StateMirror,
    pub(crate) clock:      StepClock,
    pub(crate) hooks:      Vec<Box<dyn StepHook>>,
    pub(crate) groups:     GroupCounter,
    pub(crate) state:      EngineState,
}

impl<K, H, V, D> StepScheduler<K, H, V, D>
where
    K: Connector,
    H: NodeHost,
    V: VisualizerSink,
    D: UnitDraw,
{
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn mapping(&self) -> &EntityNodeMap<H::Node> {
        &self.mapping
    }

    pub fn clock(&self) -> &StepClock {
        &self.clock
    }

    #[inline]
    pub fn interval(&self) -> SimTime {
        self.clock.interval
    }

    pub fn sampling(&self) -> &SamplingPolicy<D> {
        &self.sampling
    }

    pub fn groups(&self) -> &GroupCounter {
        &self.groups
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    pub fn visualizer(&self) -> &V {
        &self.viz
    }

    pub fn connector(&self) -> &K {
        &self.connector
    }

    /// Give the host back, e.g. to inspect it after the run.
    pub fn take_host(&mut self) -> Option<H> {
        self.host.take()
    }

    pub fn add_hook(&mut self, hook: Box<dyn StepHook>) {
        self.hooks.push(hook);
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Start the external simulator, optionally centre the visualiser,
    /// advance to the start offset and mirror the initial population.
    pub fn setup(&mut self, host: H) -> SyncResult<StepOutcome> {
        if self.state != EngineState::Uninitialized {
            return Err(SyncError::State { op: "setup", state: self.state });
        }
        self.host = Some(host);
        match self.try_setup() {
            Ok(outcome) => {
                self.state = EngineState::Ready;
                info!(
                    joint_time = %outcome.joint_time,
                    mapped = outcome.mapped,
                    "synchronisation set up"
                );
                Ok(outcome)
            }
            Err(e) => Err(self.fail("setup", e)),
        }
    }

    /// Run one joint step for local time `local_now`.
    pub fn tick(&mut self, local_now: SimTime) -> SyncResult<StepOutcome> {
        if !matches!(self.state, EngineState::Ready | EngineState::Ticking) {
            return Err(SyncError::State { op: "tick", state: self.state });
        }
        let joint = match self.clock.next_joint_time(local_now) {
            Some(joint) if self.clock.last_joint_time().is_none_or(|last| joint > last) => joint,
            _ => return Err(SyncError::State { op: "tick", state: self.state }),
        };
        match self.try_tick(joint) {
            Ok(outcome) => {
                self.state = EngineState::Ticking;
                Ok(outcome)
            }
            Err(e) if e.is_fatal() => Err(self.fail("tick", e)),
            Err(e) => Err(e),
        }
    }

    /// Close the control channel and terminate the visualiser.  Idempotent.
    ///
    /// A failed close is returned, but the process is released regardless.
    pub fn stop(&mut self) -> SyncResult<()> {
        if self.state == EngineState::Stopped {
            return Ok(());
        }
        self.state = EngineState::Stopped;
        self.viz.terminate();
        let Some(mut channel) = self.channel.take() else { return Ok(()) };
        let closed = self.connector.shutdown(&mut channel);
        info!(steps = self.clock.steps(), "synchronisation stopped");
        closed.map_err(SyncError::from)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn try_setup(&mut self) -> SyncResult<StepOutcome> {
        let channel = self.connector.start()?;
        let channel = self.channel.insert(channel);

        if self.viz.is_connected() {
            let bounds = channel.world_boundary()?;
            let lower_left = channel.to_geo(bounds.lower_left)?;
            let upper_right = channel.to_geo(bounds.upper_right)?;
            let center = lower_left.midpoint(upper_right);
            self.viz.send_map_center(center)?;
            debug!(%center, "visualiser centred on network");
        }

        let start = self.clock.start_offset;
        channel.step_to(start)?;
        self.clock.mark_started();

        self.sync_population(0, start)
    }

    fn try_tick(&mut self, joint: SimTime) -> SyncResult<StepOutcome> {
        let step = self.clock.steps() + 1;
        let Self { channel, hooks, groups, mapping, clock, .. } = &mut *self;
        let channel = channel
            .as_mut()
            .ok_or(SyncError::State { op: "tick", state: EngineState::Stopped })?;

        for hook in hooks.iter_mut() {
            let mut ctx = TickContext {
                step,
                joint_time: joint,
                mapped: mapping.len(),
                channel: &mut *channel,
                groups: &mut *groups,
            };
            hook.before_step(&mut ctx)?;
        }

        channel.step_to(joint)?;
        clock.mark_step(joint);
        debug!(step, %joint, "external simulator advanced");

        self.sync_population(step, joint)
    }

    /// Reconcile, then refresh.
    fn sync_population(&mut self, step: u64, joint: SimTime) -> SyncResult<StepOutcome> {
        let Self { channel, host, viz, mapping, sampling, reconciler, mirror, state, .. } = &mut *self;
        let channel = channel.as_mut().ok_or(SyncError::State { op: "sync", state: *state })?;
        let host = host.as_mut().ok_or(SyncError::State { op: "sync", state: *state })?;

        let reconciliation = reconciler.reconcile(channel, host, mapping, sampling)?;
        let refreshed = mirror.refresh(channel, host, mapping, viz)?;

        Ok(StepOutcome { step, joint_time: joint, reconciliation, refreshed, mapped: mapping.len() })
    }

    /// Fatal path: visualiser first, then the external simulator.
    fn fail(&mut self, op: &'static str, err: SyncError) -> SyncError {
        error!(op, error = %err, "fatal synchronisation error");
        self.viz.terminate();
        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = self.connector.shutdown(&mut channel) {
                warn!(error = %e, "could not release external simulator after failure");
            }
        }
        self.state = EngineState::Stopped;
        err
    }
}
