//! `cs-viz`: optional visualiser sink.
//!
//! The engine pushes the map centre once at setup and one object update per
//! mirrored vehicle per joint step.  A failed send is fatal for the
//! co-simulation; [`VisualizerSink::terminate`] is called on every fatal
//! path before the error surfaces.
//!
//! Datagram protocol of [`UdpVisualizer`] (plain ASCII, one message per
//! datagram):
//!
//! ```text
//! map,<lat>,<lon>
//! object,<id>,<lat>,<lon>,<heading>
//! terminate
//! ```

pub mod error;
pub mod sink;
pub mod udp;


pub use error::{VizError, VizResult};
pub use sink::{NoVisualizer, VisualizerSink};
pub use udp::UdpVisualizer;
