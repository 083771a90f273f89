//! Per-step entity lifecycle reconciliation.

use std::collections::HashSet;

use cs_core::{EntityId, UnitDraw};
use cs_traci::ControlChannel;
use tracing::{debug, warn};

use crate::{EntityNodeMap, HostError, NodeHost, SamplingPolicy, ServiceRule, SyncError, SyncResult};

/// What one reconciliation pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Newly mapped, in arrival order.
    pub included:     Vec<EntityId>,
    /// Unmapped and released, in departure order.
    pub excluded:     Vec<EntityId>,
    /// Rejected by the sampling draw this step.
    pub sampled_out:  Vec<EntityId>,
    /// Appeared and disappeared within the same step; ignored.
    pub pass_through: Vec<EntityId>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
            && self.excluded.is_empty()
            && self.sampled_out.is_empty()
            && self.pass_through.is_empty()
    }
}

/// Applies one step's arrivals and departures to the mapping.
///
/// A pass either completes or leaves the mapping untouched: both id lists
/// are fetched before anything changes, and if the host fails to supply a
/// node, every node obtained earlier in the same pass is handed back through
/// `exclude` before the error is returned.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    rule: ServiceRule,
}

impl Reconciler {
    pub fn new(rule: ServiceRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &ServiceRule {
        &self.rule
    }

    pub fn reconcile<C, H, D>(
        &self,
        channel:  &mut C,
        host:     &mut H,
        mapping:  &mut EntityNodeMap<H::Node>,
        sampling: &mut SamplingPolicy<D>,
    ) -> SyncResult<Reconciliation>
    where
        C: ControlChannel + ?Sized,
        H: NodeHost,
        D: UnitDraw,
    {
        let arrived = channel.arrived_ids()?;
        let departed = channel.departed_ids()?;

        let arrived_set: HashSet<&EntityId> = arrived.iter().collect();
        let departed_set: HashSet<&EntityId> = departed.iter().collect();

        let mut report = Reconciliation::default();
        let mut staged: Vec<(EntityId, H::Node)> = Vec::new();
        let mut seen: HashSet<&EntityId> = HashSet::new();

        // ── Arrivals (staged) ─────────────────────────────────────────────
        for id in &arrived {
            if !seen.insert(id) {
                continue;
            }
            if departed_set.contains(id) {
                report.pass_through.push(id.clone());
                continue;
            }
            if mapping.contains(id) || sampling.is_sampled_out(id) {
                continue;
            }
            if !sampling.admit(id) {
                report.sampled_out.push(id.clone());
                continue;
            }

            let profile = self.rule.classify(id);
            let node = match host.include(id, profile) {
                Ok(node) => node,
                Err(source) => {
                    release(host, &mut staged);
                    return Err(SyncError::Host { id: id.clone(), source });
                }
            };
            let reused = mapping.entity_for(node).is_some()
                || staged.iter().any(|(_, n)| *n == node);
            if reused {
                // The duplicate belongs to someone else; only our own
                // staged nodes are handed back.
                release(host, &mut staged);
                return Err(SyncError::Host {
                    id:     id.clone(),
                    source: HostError::new(format!("host returned {node:?}, which is already in use")),
                });
            }
            staged.push((id.clone(), node));
        }

        // ── Commit ────────────────────────────────────────────────────────
        for (id, node) in staged {
            mapping.insert(id.clone(), node);
            report.included.push(id);
        }

        // ── Departures ────────────────────────────────────────────────────
        for id in &departed {
            if arrived_set.contains(id) {
                continue;
            }
            if let Some(node) = mapping.remove(id) {
                host.exclude(node, id);
                report.excluded.push(id.clone());
            }
        }

        debug!(
            included = report.included.len(),
            excluded = report.excluded.len(),
            sampled_out = report.sampled_out.len(),
            pass_through = report.pass_through.len(),
            mapped = mapping.len(),
            "reconciled"
        );
        Ok(report)
    }
}

/// Hand back nodes obtained during a failed pass, newest first.
fn release<H: NodeHost>(host: &mut H, staged: &mut Vec<(EntityId, H::Node)>) {
    if !staged.is_empty() {
        warn!(count = staged.len(), "rolling back nodes included during failed reconciliation");
    }
    while let Some((id, node)) = staged.pop() {
        host.exclude(node, &id);
    }
}
