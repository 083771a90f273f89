//! Fluent builder for constructing a [`StepScheduler`].

use cs_core::{SimRng, StepClock, SyncConfig, UnitDraw};
use cs_process::Connector;
use cs_viz::{NoVisualizer, VisualizerSink};

use crate::{
    EngineState, EntityNodeMap, GroupCounter, NodeHost, Reconciler, SamplingPolicy,
    ServiceRule, StateMirror, StepHook, StepScheduler, SyncResult,
};

/// Fluent builder for [`StepScheduler`].
///
/// # Required inputs
///
/// - [`SyncConfig`]: interval, start offset, penetration rate, …
/// - `K: Connector`: usually [`cs_process::ProcessManager`]
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                          |
/// |---------------------|--------------------------------------------------|
/// | `.visualizer(v)`    | [`NoVisualizer`]                                 |
/// | `.draws(d)`         | `SimRng` seeded from `sampling_seed` / entropy   |
/// | `.service_rule(r)`  | prefixes from `full_service_prefixes`            |
/// | `.hook(h)`          | none                                             |
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = SchedulerBuilder::new(config.sync.clone(), manager)
///     .visualizer(UdpVisualizer::connect("127.0.0.1:48110")?)
///     .hook(Box::new(InjectPlatoons::every(SimTime::from_secs(10))))
///     .build::<NodePool>()?;
/// ```
pub struct SchedulerBuilder<K: Connector, V: VisualizerSink = NoVisualizer, D: UnitDraw = SimRng> {
    config:    SyncConfig,
    connector: K,
    viz:       V,
    draws:     D,
    rule:      Option<ServiceRule>,
    hooks:     Vec<Box<dyn StepHook>>,
}

impl<K: Connector> SchedulerBuilder<K, NoVisualizer, SimRng> {
    pub fn new(config: SyncConfig, connector: K) -> Self {
        Self {
            draws: SamplingPolicy::<SimRng>::seeded_rng(&config),
            config,
            connector,
            viz:   NoVisualizer,
            rule:  None,
            hooks: Vec::new(),
        }
    }
}

impl<K: Connector, V: VisualizerSink, D: UnitDraw> SchedulerBuilder<K, V, D> {
    /// Send map and vehicle updates to `viz`.
    pub fn visualizer<V2: VisualizerSink>(self, viz: V2) -> SchedulerBuilder<K, V2, D> {
        SchedulerBuilder {
            config:    self.config,
            connector: self.connector,
            viz,
            draws:     self.draws,
            rule:      self.rule,
            hooks:     self.hooks,
        }
    }

    /// Replace the sampling draw source (fixed sequences in tests).
    pub fn draws<D2: UnitDraw>(self, draws: D2) -> SchedulerBuilder<K, V, D2> {
        SchedulerBuilder {
            config:    self.config,
            connector: self.connector,
            viz:       self.viz,
            draws,
            rule:      self.rule,
            hooks:     self.hooks,
        }
    }

    pub fn service_rule(mut self, rule: ServiceRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn hook(mut self, hook: Box<dyn StepHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Validate the configuration and assemble the scheduler for host `H`.
    ///
    /// An invalid configuration terminates the visualiser before the error
    /// is returned.
    pub fn build<H: NodeHost>(mut self) -> SyncResult<StepScheduler<K, H, V, D>> {
        if let Err(e) = self.config.validate() {
            self.viz.terminate();
            return Err(e.into());
        }
        let sampling = SamplingPolicy::new(self.config.penetration_rate, self.draws)?;
        let rule = self
            .rule
            .unwrap_or_else(|| ServiceRule::with_prefixes(self.config.full_service_prefixes.iter().cloned()));

        Ok(StepScheduler {
            connector:  self.connector,
            channel:    None,
            host:       None,
            viz:        self.viz,
            mapping:    EntityNodeMap::new(),
            sampling,
            reconciler: Reconciler::new(rule),
            mirror:     StateMirror::new(self.config.altitude, self.config.mirror_kinematics),
            clock:      StepClock::new(self.config.interval(), self.config.start_offset()),
            hooks:      self.hooks,
            groups:     GroupCounter::new(),
            state:      EngineState::Uninitialized,
        })
    }
}
