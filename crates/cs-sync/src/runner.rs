//! `CoSimulation`: couples the local timeline to the step scheduler.

use cs_core::{SimTime, UnitDraw};
use cs_process::Connector;
use cs_viz::VisualizerSink;

use crate::{
    Clock, EngineObserver, Event, NoClock, NodeHost, StepScheduler, SyncResult, Timeline,
};

/// Event loop owning a [`Timeline`] and a [`StepScheduler`].
///
/// Joint steps are self-rescheduling timeline events one interval apart;
/// host events scheduled through [`schedule_host`][Self::schedule_host] are
/// interleaved in time order and delivered to [`NodeHost::on_event`].
pub struct CoSimulation<K, H, V, D, C = NoClock>
where
    K: Connector,
    H: NodeHost,
    V: VisualizerSink,
    D: UnitDraw,
    C: Clock,
{
    scheduler: StepScheduler<K, H, V, D>,
    timeline:  Timeline<H::Event, C>,
}

impl<K, H, V, D, C> CoSimulation<K, H, V, D, C>
where
    K: Connector,
    H: NodeHost,
    V: VisualizerSink,
    D: UnitDraw,
    C: Clock,
{
    pub fn new(scheduler: StepScheduler<K, H, V, D>, clock: C) -> Self {
        Self { scheduler, timeline: Timeline::new(clock) }
    }

    pub fn scheduler(&self) -> &StepScheduler<K, H, V, D> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut StepScheduler<K, H, V, D> {
        &mut self.scheduler
    }

    /// Local simulated time.
    pub fn now(&self) -> SimTime {
        self.timeline.now()
    }

    /// Deliver `event` to the host at local time `at`.
    pub fn schedule_host(&mut self, at: SimTime, event: H::Event) {
        self.timeline.schedule_at(at, Event::Host(event));
    }

    /// Set up the scheduler and queue the first joint step one interval
    /// from now.  A pacing clock starts counting once setup is done.
    pub fn start<O: EngineObserver>(&mut self, host: H, observer: &mut O) -> SyncResult<()> {
        let outcome = self.scheduler.setup(host)?;
        observer.on_setup(&outcome.report());
        self.timeline.anchor_clock();
        self.timeline.schedule_in(self.scheduler.interval(), Event::JointStep);
        Ok(())
    }

    /// Process events up to and including local time `until`.  Returns the
    /// number of joint steps run.
    pub fn run_until<O: EngineObserver>(&mut self, until: SimTime, observer: &mut O) -> SyncResult<u64> {
        let mut steps = 0;
        while let Some((now, event)) = self.timeline.pop_until(until) {
            match event {
                Event::JointStep => {
                    let outcome = self.scheduler.tick(now)?;
                    observer.on_step(&outcome.report());
                    self.timeline.schedule_in(self.scheduler.interval(), Event::JointStep);
                    steps += 1;
                }
                Event::Host(e) => {
                    if let Some(host) = self.scheduler.host_mut() {
                        host.on_event(now, e);
                    }
                }
            }
        }
        self.timeline.advance_to(until);
        Ok(steps)
    }

    /// Drop pending events and stop the scheduler.
    pub fn stop<O: EngineObserver>(&mut self, observer: &mut O) -> SyncResult<()> {
        self.timeline.clear();
        let result = self.scheduler.stop();
        observer.on_stop(self.scheduler.clock().steps());
        result
    }

    /// `start`, `run_until(until)`, `stop`.  The observer's `on_stop` runs
    /// even when the run fails.
    pub fn run<O: EngineObserver>(&mut self, host: H, until: SimTime, observer: &mut O) -> SyncResult<u64> {
        let ran = self
            .start(host, observer)
            .and_then(|()| self.run_until(until, observer));
        match ran {
            Ok(steps) => {
                self.stop(observer)?;
                Ok(steps)
            }
            Err(e) => {
                // Scheduler already released everything on the fatal path.
                self.timeline.clear();
                observer.on_stop(self.scheduler.clock().steps());
                Err(e)
            }
        }
    }
}
