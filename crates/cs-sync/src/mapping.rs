//! `EntityNodeMap`: the vehicle id ↔ local node bijection.
//!
//! Forward entries live in a `BTreeMap` so iteration (and therefore the
//! order of position queries and host callbacks) is deterministic.  The
//! reverse index answers "which vehicle owns this node?".

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use cs_core::EntityId;

#[cfg(feature = "fx-hash")]
type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type FastMap<K, V> = std::collections::HashMap<K, V>;

/// Opaque host-supplied node handle.
pub trait NodeHandle: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> NodeHandle for T {}

/// One-to-one map between included vehicles and their local nodes.
#[derive(Debug, Clone)]
pub struct EntityNodeMap<N: NodeHandle> {
    forward: BTreeMap<EntityId, N>,
    reverse: FastMap<N, EntityId>,
}

impl<N: NodeHandle> Default for EntityNodeMap<N> {
    fn default() -> Self {
        Self { forward: BTreeMap::new(), reverse: FastMap::default() }
    }
}

impl<N: NodeHandle> EntityNodeMap<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `id` to `node`.  Returns `false` and changes nothing if either
    /// side is already mapped.
    pub fn insert(&mut self, id: EntityId, node: N) -> bool {
        if self.forward.contains_key(&id) || self.reverse.contains_key(&node) {
            return false;
        }
        self.reverse.insert(node, id.clone());
        self.forward.insert(id, node);
        true
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<N> {
        let node = self.forward.remove(id)?;
        self.reverse.remove(&node);
        Some(node)
    }

    #[inline]
    pub fn get(&self, id: &EntityId) -> Option<N> {
        self.forward.get(id).copied()
    }

    #[inline]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.forward.contains_key(id)
    }

    /// Vehicle currently owning `node`.
    #[inline]
    pub fn entity_for(&self, node: N) -> Option<&EntityId> {
        self.reverse.get(&node)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, N)> + '_ {
        self.forward.iter().map(|(id, &node)| (id, node))
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> + '_ {
        self.forward.keys()
    }
}
