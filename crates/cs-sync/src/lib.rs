//! `cs-sync`: keeps a local node population mirrored onto the vehicles of
//! an external traffic simulator.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`mapping`]     | `EntityNodeMap`: bijection between vehicle ids and nodes  |
//! | [`sampling`]    | `SamplingPolicy`: penetration-rate inclusion decisions     |
//! | [`services`]    | `ServiceRule`, `ServiceProfile`                             |
//! | [`host`]        | `NodeHost` trait, `NodePool` fixed-capacity host            |
//! | [`reconcile`]   | `Reconciler`: per-step include/exclude                     |
//! | [`mirror`]      | `StateMirror`: per-step position refresh                   |
//! | [`hooks`]       | `StepHook`, `TickContext`, `GroupCounter`                   |
//! | [`scheduler`]   | `StepScheduler`: setup / tick / stop state machine         |
//! | [`builder`]     | `SchedulerBuilder`: fluent construction                    |
//! | [`timeline`]    | `Timeline`, `Clock`, `NoClock`, `SystemClock`               |
//! | [`runner`]      | `CoSimulation`: timeline + scheduler event loop            |
//! | [`observer`]    | `EngineObserver`, `NoopObserver`, `TracingObserver`         |
//! | [`trace`]       | `CsvStepTrace`: per-step CSV output                        |
//! | [`error`]       | `SyncError`, `SyncResult<T>`                                |
//!
//! # Quick start
//!
//! ```rust,ignore
//! let config = CoSimConfig::from_json_file(path)?;
//! let connector = ProcessManager::new(config.process.clone(), config.sync.interval());
//! let scheduler = SchedulerBuilder::new(config.sync.clone(), connector).build()?;
//! let mut cosim = CoSimulation::new(scheduler, NoClock);
//! cosim.run(NodePool::new(64), SimTime::from_secs(300), &mut TracingObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod hooks;
pub mod host;
pub mod mapping;
pub mod mirror;
pub mod observer;
pub mod reconcile;
pub mod runner;
pub mod sampling;
pub mod scheduler;
pub mod services;
pub mod timeline;
pub mod trace;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::SchedulerBuilder;
pub use error::{SyncError, SyncResult};
pub use hooks::{GroupCounter, StepHook, TickContext};
pub use host::{HostError, NodeHost, NodePool};
pub use mapping::{EntityNodeMap, NodeHandle};
pub use mirror::StateMirror;
pub use observer::{EngineObserver, NoopObserver, StepReport, TracingObserver};
pub use reconcile::{Reconciler, Reconciliation};
pub use runner::CoSimulation;
pub use sampling::SamplingPolicy;
pub use scheduler::{EngineState, StepOutcome, StepScheduler};
pub use services::{ServiceProfile, ServiceRule};
pub use timeline::{Clock, Event, NoClock, SyncStatus, SystemClock, Timeline};
pub use trace::CsvStepTrace;
