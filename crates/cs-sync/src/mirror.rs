//! Per-step state refresh: external positions → local nodes (and the
//! visualiser).

use cs_traci::ControlChannel;
use cs_viz::VisualizerSink;

use crate::{EntityNodeMap, NodeHost, SyncResult};

#[derive(Copy, Clone, Debug)]
pub struct StateMirror {
    /// Third coordinate written into every node position.
    pub altitude:   f64,
    /// Also mirror heading and speed.
    pub kinematics: bool,
}

impl StateMirror {
    pub fn new(altitude: f64, kinematics: bool) -> Self {
        Self { altitude, kinematics }
    }

    /// Refresh every mapped node, in ascending id order.  Returns the number
    /// of nodes updated.
    ///
    /// The first failing query or send aborts the pass; nodes already
    /// refreshed keep their new state.
    pub fn refresh<C, H, V>(
        &self,
        channel: &mut C,
        host:    &mut H,
        mapping: &EntityNodeMap<H::Node>,
        viz:     &mut V,
    ) -> SyncResult<usize>
    where
        C: ControlChannel + ?Sized,
        H: NodeHost,
        V: VisualizerSink + ?Sized,
    {
        let mut updated = 0;
        for (id, node) in mapping.iter() {
            let planar = channel.position(id)?;
            host.set_position(node, planar.with_altitude(self.altitude));

            let mut heading = None;
            if self.kinematics {
                let h = channel.heading(id)?;
                let speed = channel.speed(id)?;
                host.set_kinematics(node, h, speed);
                heading = Some(h);
            }

            if viz.is_connected() {
                let geo = channel.to_geo(planar)?;
                let heading = match heading {
                    Some(h) => h,
                    None    => channel.heading(id)?,
                };
                viz.send_object_update(id, geo, heading)?;
            }
            updated += 1;
        }
        Ok(updated)
    }
}
