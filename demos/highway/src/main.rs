//! highway: mirror the vehicles of a SUMO highway scenario onto a local
//! node pool.
//!
//! Usage: `highway [config.json] [duration_secs]`
//!
//! Writes `highway_steps.csv` into the working directory.  Set `RUST_LOG`
//! (e.g. `RUST_LOG=debug`) for per-step logging.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cs_core::{CoSimConfig, EntityId, Position, SimTime};
use cs_process::ProcessManager;
use cs_sync::{
    Clock, CoSimulation, CsvStepTrace, HostError, NoClock, NodeHost, NodePool, SchedulerBuilder,
    ServiceProfile, StepHook, SyncResult, SystemClock, TickContext, TracingObserver,
};
use cs_viz::{NoVisualizer, UdpVisualizer, VisualizerSink};

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_CONFIG:    &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/highway.json");
const DEFAULT_DURATION:  u64  = 120;
const POOL_CAPACITY:     u32  = 256;
const BATCH_EVERY_STEPS: u64  = 50;
const REPORT_EVERY_SECS: u64  = 10;
const TRACE_PATH:        &str = "highway_steps.csv";

// ── Host ──────────────────────────────────────────────────────────────────────

/// Local events delivered through the co-simulation timeline.
enum HostEvent {
    Report,
}

/// A [`NodePool`] that also counts full-service inclusions and prints a
/// short population report on request.
struct HighwayHost {
    pool:         NodePool,
    full_service: usize,
}

impl NodeHost for HighwayHost {
    type Node = cs_core::NodeId;
    type Event = HostEvent;

    fn include(&mut self, id: &EntityId, profile: ServiceProfile) -> Result<Self::Node, HostError> {
        let node = self.pool.include(id, profile)?;
        if profile == ServiceProfile::Full {
            self.full_service += 1;
        }
        Ok(node)
    }

    fn exclude(&mut self, node: Self::Node, id: &EntityId) {
        self.pool.exclude(node, id);
    }

    fn set_position(&mut self, node: Self::Node, position: Position) {
        self.pool.set_position(node, position);
    }

    fn set_kinematics(&mut self, node: Self::Node, heading: f64, speed: f64) {
        self.pool.set_kinematics(node, heading, speed);
    }

    fn on_event(&mut self, now: SimTime, event: HostEvent) {
        match event {
            HostEvent::Report => {
                let active = self.pool.active();
                let mean_speed = if active == 0 {
                    0.0
                } else {
                    self.pool.active_slots().map(|(_, s)| s.speed).sum::<f64>() / active as f64
                };
                println!(
                    "[{now}] active nodes: {active}/{}  mean speed: {mean_speed:.1} m/s  full-service so far: {}",
                    self.pool.capacity(),
                    self.full_service,
                );
            }
        }
    }
}

// ── Step hook ─────────────────────────────────────────────────────────────────

/// Opens a new vehicle batch every `every` steps.
struct BatchMarker {
    every: u64,
}

impl StepHook for BatchMarker {
    fn before_step(&mut self, ctx: &mut TickContext<'_>) -> SyncResult<()> {
        if ctx.step % self.every == 0 {
            let batch = ctx.groups.allocate();
            info!(batch, step = ctx.step, joint_time = %ctx.joint_time, mapped = ctx.mapped, "batch window");
        }
        Ok(())
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let duration = match args.next() {
        Some(s) => s.parse::<u64>().with_context(|| format!("invalid duration `{s}`"))?,
        None    => DEFAULT_DURATION,
    };

    let config = CoSimConfig::from_json_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    println!("=== highway: co-simulation bridge ===");
    println!(
        "Interval: {}s  |  Penetration: {:.0}%  |  Duration: {duration}s",
        config.sync.interval_secs,
        config.sync.penetration_rate * 100.0,
    );

    // Past this point the engine owns the visualiser and terminates it on
    // every failure.
    let trace = CsvStepTrace::create(Path::new(TRACE_PATH))
        .with_context(|| format!("creating {TRACE_PATH}"))?;

    let viz: Box<dyn VisualizerSink> = match &config.visualizer {
        Some(v) => Box::new(
            UdpVisualizer::connect(&v.address)
                .with_context(|| format!("visualiser at {}", v.address))?,
        ),
        None => Box::new(NoVisualizer),
    };

    let until = SimTime::from_secs(duration);
    let steps = if config.sync.real_time {
        run(&config, viz, trace, SystemClock::new(), until)?
    } else {
        run(&config, viz, trace, NoClock, until)?
    };

    println!("Done: {steps} joint steps, trace in {TRACE_PATH}");
    Ok(())
}

fn run<C: Clock>(
    config: &CoSimConfig,
    viz:    Box<dyn VisualizerSink>,
    trace:  CsvStepTrace,
    clock:  C,
    until:  SimTime,
) -> Result<u64> {
    let connector = ProcessManager::new(config.process.clone(), config.sync.interval());
    let scheduler = SchedulerBuilder::new(config.sync.clone(), connector)
        .visualizer(viz)
        .hook(Box::new(BatchMarker { every: BATCH_EVERY_STEPS }))
        .build::<HighwayHost>()?;

    let mut cosim = CoSimulation::new(scheduler, clock);
    let mut secs = REPORT_EVERY_SECS;
    while secs * 1_000 <= until.as_millis() {
        cosim.schedule_host(SimTime::from_secs(secs), HostEvent::Report);
        secs += REPORT_EVERY_SECS;
    }

    let mut observer = (TracingObserver, trace);

    let host = HighwayHost { pool: NodePool::new(POOL_CAPACITY), full_service: 0 };
    let steps = cosim.run(host, until, &mut observer)?;

    if let Some(e) = observer.1.take_error() {
        return Err(e).context("writing step trace");
    }
    Ok(steps)
}
