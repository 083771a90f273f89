//! `cs-core`: foundational types for the co-simulation bridge.
//!
//! This crate is a dependency of every other `cs-*` crate.  It has no `cs-*`
//! dependencies and only a handful of external ones (`rand`, `thiserror`,
//! `serde`, `serde_json`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `EntityId` (external vehicle id), `NodeId`            |
//! | [`geo`]         | `Position`, `PlanarPoint`, `GeoPoint`, `Boundary`     |
//! | [`time`]        | `SimTime`, `StepClock`                                |
//! | [`rng`]         | `SimRng`, `UnitDraw`                                  |
//! | [`config`]      | `CoSimConfig` and its sections                        |
//! | [`error`]       | `CoreError`, `CoreResult`                             |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CoSimConfig, ConnectConfig, ProcessConfig, SyncConfig, VisualizerConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{Boundary, GeoPoint, PlanarPoint, Position};
pub use ids::{EntityId, NodeId};
pub use rng::{SimRng, UnitDraw};
pub use time::{SimTime, StepClock};
