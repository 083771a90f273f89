//! The `ControlChannel` trait: the main seam between the engine and the
//! external simulator.

use cs_core::{Boundary, EntityId, GeoPoint, PlanarPoint, SimTime};

use crate::TraciResult;

/// Synchronous request/response surface of the external traffic simulator.
///
/// Every call blocks until the simulator replies.  An `Err` from any method
/// means the simulator died or misbehaved; callers treat it as fatal.
///
/// [`TraciClient`][crate::TraciClient] implements this over TCP; tests
/// substitute scripted implementations.
///
/// # Naming
///
/// `arrived_ids` returns vehicles that *appeared* since the last step and
/// `departed_ids` those that *disappeared*, from the point of view of the
/// mirrored population.  The traffic simulator names these the other way
/// round (a vehicle "departs" into the network and "arrives" at its
/// destination).
pub trait ControlChannel {
    /// Advance the external simulation to the absolute time `time`.
    fn step_to(&mut self, time: SimTime) -> TraciResult<()>;

    /// Vehicles that began existing during the last step.
    fn arrived_ids(&mut self) -> TraciResult<Vec<EntityId>>;

    /// Vehicles that stopped existing during the last step.
    fn departed_ids(&mut self) -> TraciResult<Vec<EntityId>>;

    /// Planar position of a vehicle.
    fn position(&mut self, id: &EntityId) -> TraciResult<PlanarPoint>;

    /// Heading in degrees, clockwise from north.
    fn heading(&mut self, id: &EntityId) -> TraciResult<f64>;

    /// Speed in m/s.
    fn speed(&mut self, id: &EntityId) -> TraciResult<f64>;

    /// Bounding box of the road network.
    fn world_boundary(&mut self) -> TraciResult<Boundary>;

    /// Project a planar point into WGS-84.
    fn to_geo(&mut self, point: PlanarPoint) -> TraciResult<GeoPoint>;

    /// Graceful protocol shutdown.  Further calls fail with `Closed`.
    fn close(&mut self) -> TraciResult<()>;
}

impl<C: ControlChannel + ?Sized> ControlChannel for Box<C> {
    fn step_to(&mut self, time: SimTime) -> TraciResult<()> {
        (**self).step_to(time)
    }
    fn arrived_ids(&mut self) -> TraciResult<Vec<EntityId>> {
        (**self).arrived_ids()
    }
    fn departed_ids(&mut self) -> TraciResult<Vec<EntityId>> {
        (**self).departed_ids()
    }
    fn position(&mut self, id: &EntityId) -> TraciResult<PlanarPoint> {
        (**self).position(id)
    }
    fn heading(&mut self, id: &EntityId) -> TraciResult<f64> {
        (**self).heading(id)
    }
    fn speed(&mut self, id: &EntityId) -> TraciResult<f64> {
        (**self).speed(id)
    }
    fn world_boundary(&mut self) -> TraciResult<Boundary> {
        (**self).world_boundary()
    }
    fn to_geo(&mut self, point: PlanarPoint) -> TraciResult<GeoPoint> {
        (**self).to_geo(point)
    }
    fn close(&mut self) -> TraciResult<()> {
        (**self).close()
    }
}
