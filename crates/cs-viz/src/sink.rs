//! The `VisualizerSink` trait.

use cs_core::{EntityId, GeoPoint};

use crate::VizResult;

/// Receiver of map and vehicle updates.
pub trait VisualizerSink {
    /// Whether updates should be sent at all.
    fn is_connected(&self) -> bool;

    fn send_map_center(&mut self, center: GeoPoint) -> VizResult<()>;

    /// `heading` in degrees, clockwise from north.
    fn send_object_update(&mut self, id: &EntityId, at: GeoPoint, heading: f64) -> VizResult<()>;

    /// Tell the visualiser to shut down.  Idempotent; never fails.
    fn terminate(&mut self);
}

/// Sink used when no visualiser is configured.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoVisualizer;

impl VisualizerSink for NoVisualizer {
    fn is_connected(&self) -> bool {
        false
    }
    fn send_map_center(&mut self, _center: GeoPoint) -> VizResult<()> {
        Ok(())
    }
    fn send_object_update(&mut self, _id: &EntityId, _at: GeoPoint, _heading: f64) -> VizResult<()> {
        Ok(())
    }
    fn terminate(&mut self) {}
}

impl<V: VisualizerSink + ?Sized> VisualizerSink for Box<V> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
    fn send_map_center(&mut self, center: GeoPoint) -> VizResult<()> {
        (**self).send_map_center(center)
    }
    fn send_object_update(&mut self, id: &EntityId, at: GeoPoint, heading: f64) -> VizResult<()> {
        (**self).send_object_update(id, at, heading)
    }
    fn terminate(&mut self) {
        (**self).terminate()
    }
}
