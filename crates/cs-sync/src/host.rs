//! The host side of the bridge: who owns the local nodes.

use std::collections::BTreeSet;

use cs_core::{EntityId, NodeId, Position, SimTime};
use thiserror::Error;
use tracing::debug;

use crate::{NodeHandle, ServiceProfile};

/// Why a host could not supply a node.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(reason: impl Into<String>) -> Self {
        HostError(reason.into())
    }
}

/// Callbacks the engine drives on the local simulation.
///
/// Injected into the scheduler at setup; the engine keeps no other
/// reference to the local simulation.
pub trait NodeHost {
    type Node: NodeHandle;

    /// Payload of host events scheduled on the local timeline.
    type Event;

    /// Supply a node for a newly mirrored vehicle.  Called exactly once per
    /// included vehicle.  An error is fatal.
    fn include(&mut self, id: &EntityId, profile: ServiceProfile) -> Result<Self::Node, HostError>;

    /// Release the node of a vehicle that left the external simulation.
    /// Called exactly once per included vehicle.
    fn exclude(&mut self, node: Self::Node, id: &EntityId);

    fn set_position(&mut self, node: Self::Node, position: Position);

    /// Heading in degrees and speed in m/s, when kinematics mirroring is on.
    fn set_kinematics(&mut self, _node: Self::Node, _heading: f64, _speed: f64) {}

    /// A host event fired on the local timeline at `now`.
    fn on_event(&mut self, _now: SimTime, _event: Self::Event) {}
}

// ── NodePool ──────────────────────────────────────────────────────────────────

/// Where released nodes are parked: far outside any road network, so they
/// are out of radio range of every active node.
pub const PARKED: Position = Position { x: -100_000.0, y: -100_000.0, z: -100_000.0 };

/// Per-node state kept by [`NodePool`].
#[derive(Clone, Debug, PartialEq)]
pub struct PoolSlot {
    pub owner:    Option<EntityId>,
    pub profile:  Option<ServiceProfile>,
    pub position: Position,
    pub heading:  f64,
    pub speed:    f64,
}

impl Default for PoolSlot {
    fn default() -> Self {
        Self { owner: None, profile: None, position: PARKED, heading: 0.0, speed: 0.0 }
    }
}

/// A fixed set of pre-created nodes handed out lowest id first.
///
/// Running out of free nodes makes `include` fail.
#[derive(Clone, Debug)]
pub struct NodePool {
    slots: Vec<PoolSlot>,
    free:  BTreeSet<u32>,
}

impl NodePool {
    pub fn new(capacity: u32) -> Self {
        Self {
            slots: vec![PoolSlot::default(); capacity as usize],
            free:  (0..capacity).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn slot(&self, node: NodeId) -> Option<&PoolSlot> {
        self.slots.get(node.index())
    }

    /// Slots currently owned by a vehicle, in node order.
    pub fn active_slots(&self) -> impl Iterator<Item = (NodeId, &PoolSlot)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.owner.is_some())
            .map(|(i, s)| (NodeId(i as u32), s))
    }
}

impl NodeHost for NodePool {
    type Node = NodeId;
    type Event = ();

    fn include(&mut self, id: &EntityId, profile: ServiceProfile) -> Result<NodeId, HostError> {
        let index = self.free.pop_first().ok_or_else(|| {
            HostError::new(format!("node pool exhausted ({} nodes)", self.slots.len()))
        })?;
        let slot = &mut self.slots[index as usize];
        slot.owner = Some(id.clone());
        slot.profile = Some(profile);
        debug!(%id, node = index, ?profile, "node assigned");
        Ok(NodeId(index))
    }

    fn exclude(&mut self, node: NodeId, id: &EntityId) {
        let Some(slot) = self.slots.get_mut(node.index()) else { return };
        *slot = PoolSlot::default();
        self.free.insert(node.0);
        debug!(%id, node = node.0, "node parked");
    }

    fn set_position(&mut self, node: NodeId, position: Position) {
        if let Some(slot) = self.slots.get_mut(node.index()) {
            slot.position = position;
        }
    }

    fn set_kinematics(&mut self, node: NodeId, heading: f64, speed: f64) {
        if let Some(slot) = self.slots.get_mut(node.index()) {
            slot.heading = heading;
            slot.speed = speed;
        }
    }
}
