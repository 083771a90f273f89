//! Plain-text UDP visualiser client.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use cs_core::{EntityId, GeoPoint};
use tracing::{debug, info, warn};

use crate::{VisualizerSink, VizError, VizResult};

/// Sends one datagram per update to a connected peer.
#[derive(Debug)]
pub struct UdpVisualizer {
    socket: Option<UdpSocket>,
    peer:   SocketAddr,
}

impl UdpVisualizer {
    /// Bind an ephemeral local socket and connect it to `address`
    /// (`host:port`).
    pub fn connect(address: &str) -> VizResult<Self> {
        let peer = address
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| VizError::Resolve(address.to_owned()))?;
        let local: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(peer)?;
        info!(%peer, "visualiser connected");
        Ok(Self { socket: Some(socket), peer })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    fn send(&mut self, message: &str) -> VizResult<()> {
        let socket = self.socket.as_ref().ok_or(VizError::NotConnected)?;
        let sent = socket.send(message.as_bytes())?;
        if sent != message.len() {
            return Err(VizError::ShortWrite { sent, len: message.len() });
        }
        Ok(())
    }
}

impl VisualizerSink for UdpVisualizer {
    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn send_map_center(&mut self, center: GeoPoint) -> VizResult<()> {
        debug!(%center, "map centre");
        self.send(&format!("map,{:.7},{:.7}", center.lat, center.lon))
    }

    fn send_object_update(&mut self, id: &EntityId, at: GeoPoint, heading: f64) -> VizResult<()> {
        self.send(&format!("object,{id},{:.7},{:.7},{heading:.2}", at.lat, at.lon))
    }

    fn terminate(&mut self) {
        if self.socket.is_none() {
            return;
        }
        if let Err(e) = self.send("terminate") {
            warn!(error = %e, "could not notify visualiser of termination");
        }
        self.socket = None;
        info!(peer = %self.peer, "visualiser terminated");
    }
}
