//! Blocking control-channel client.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use cs_core::{Boundary, EntityId, GeoPoint, PlanarPoint, SimTime};
use tracing::{debug, trace, warn};

use crate::constants::*;
use crate::message::{
    check_status, frame_request, get_variable_payload, read_command_header, read_message,
    status_name, write_message,
};
use crate::{ControlChannel, TraciError, TraciResult, WireReader, WireWriter};

/// Object domain of a "get variable" query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Domain {
    Simulation,
    Vehicle,
}

impl Domain {
    fn get_command(self) -> u8 {
        match self {
            Domain::Simulation => CMD_GET_SIM_VARIABLE,
            Domain::Vehicle    => CMD_GET_VEHICLE_VARIABLE,
        }
    }

    fn response_command(self) -> u8 {
        match self {
            Domain::Simulation => RESPONSE_GET_SIM_VARIABLE,
            Domain::Vehicle    => RESPONSE_GET_VEHICLE_VARIABLE,
        }
    }
}

fn expect_type(got: u8, expected: u8) -> TraciResult<()> {
    if got == expected {
        Ok(())
    } else {
        Err(TraciError::UnexpectedType { expected, got })
    }
}

// ── TraciClient ───────────────────────────────────────────────────────────────

/// Control-channel client over any blocking byte stream.
///
/// `S` is a [`TcpStream`] in production (see [`TraciClient::connect`]); tests
/// use in-memory streams.  After [`close`][ControlChannel::close] the stream
/// is dropped and every further call fails with [`TraciError::Closed`].
pub struct TraciClient<S: Read + Write = TcpStream> {
    stream: Option<S>,
}

impl TraciClient<TcpStream> {
    /// Open a TCP connection to `host:port`, trying every resolved address.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> TraciResult<Self> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    debug!(%addr, "control channel connected");
                    return Ok(Self::new(stream));
                }
                Err(e) => last_err = Some(e),
            }
        }
        let err = last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{host}:{port} did not resolve"))
        });
        Err(err.into())
    }
}

impl<S: Read + Write> TraciClient<S> {
    pub fn new(stream: S) -> Self {
        Self { stream: Some(stream) }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Give back the underlying stream, if still open.
    pub fn into_inner(self) -> Option<S> {
        self.stream
    }

    /// Protocol version handshake: `(api_version, simulator_identifier)`.
    pub fn version(&mut self) -> TraciResult<(i32, String)> {
        self.request(CMD_GETVERSION, &[], |r| {
            read_command_header(r, CMD_GETVERSION)?;
            let api = r.read_i32()?;
            let ident = r.read_string()?;
            Ok((api, ident))
        })
    }

    /// Send one command and parse the response body after its status.
    fn request<T>(
        &mut self,
        command: u8,
        payload: &[u8],
        parse:   impl FnOnce(&mut WireReader<'_>) -> TraciResult<T>,
    ) -> TraciResult<T> {
        let stream = self.stream.as_mut().ok_or(TraciError::Closed)?;
        write_message(stream, &frame_request(command, payload))?;
        let body = read_message(stream)?;

        let mut r = WireReader::new(&body);
        if let Err(e) = check_status(&mut r, command) {
            if let TraciError::CommandFailed { status, description, .. } = &e {
                warn!(
                    command = format_args!("{command:#04x}"),
                    status = status_name(*status),
                    %description,
                    "command rejected by simulator"
                );
            }
            return Err(e);
        }
        parse(&mut r)
    }

    /// Issue a "get variable" query and decode the typed value.
    fn query<T>(
        &mut self,
        domain:   Domain,
        variable: u8,
        object:   &str,
        params:   &[u8],
        decode:   impl FnOnce(u8, &mut WireReader<'_>) -> TraciResult<T>,
    ) -> TraciResult<T> {
        let payload = get_variable_payload(variable, object, params);
        self.request(domain.get_command(), &payload, |r| {
            read_command_header(r, domain.response_command())?;
            let var = r.read_u8()?;
            if var != variable {
                return Err(TraciError::Malformed(format!(
                    "asked for variable {variable:#04x}, got {var:#04x}"
                )));
            }
            let _object = r.read_string()?;
            let value_type = r.read_u8()?;
            decode(value_type, r)
        })
    }

    fn query_ids(&mut self, variable: u8) -> TraciResult<Vec<EntityId>> {
        self.query(Domain::Simulation, variable, "", &[], |ty, r| {
            expect_type(ty, TYPE_STRINGLIST)?;
            Ok(r.read_string_list()?.into_iter().map(EntityId::from).collect())
        })
    }

    fn query_vehicle_double(&mut self, variable: u8, id: &EntityId) -> TraciResult<f64> {
        self.query(Domain::Vehicle, variable, id.as_str(), &[], |ty, r| {
            expect_type(ty, TYPE_DOUBLE)?;
            r.read_f64()
        })
    }
}

impl<S: Read + Write> ControlChannel for TraciClient<S> {
    fn step_to(&mut self, time: SimTime) -> TraciResult<()> {
        let mut payload = WireWriter::new();
        payload.write_f64(time.as_secs_f64());
        self.request(CMD_SIMSTEP, payload.as_slice(), |r| {
            // No subscriptions are ever placed, so the result list is empty.
            let subscriptions = r.read_i32()?;
            trace!(%time, subscriptions, "simulation step acknowledged");
            Ok(())
        })
    }

    fn arrived_ids(&mut self) -> TraciResult<Vec<EntityId>> {
        self.query_ids(VAR_DEPARTED_VEHICLES_IDS)
    }

    fn departed_ids(&mut self) -> TraciResult<Vec<EntityId>> {
        self.query_ids(VAR_ARRIVED_VEHICLES_IDS)
    }

    fn position(&mut self, id: &EntityId) -> TraciResult<PlanarPoint> {
        self.query(Domain::Vehicle, VAR_POSITION, id.as_str(), &[], |ty, r| {
            expect_type(ty, POSITION_2D)?;
            let x = r.read_f64()?;
            let y = r.read_f64()?;
            Ok(PlanarPoint::new(x, y))
        })
    }

    fn heading(&mut self, id: &EntityId) -> TraciResult<f64> {
        self.query_vehicle_double(VAR_ANGLE, id)
    }

    fn speed(&mut self, id: &EntityId) -> TraciResult<f64> {
        self.query_vehicle_double(VAR_SPEED, id)
    }

    fn world_boundary(&mut self) -> TraciResult<Boundary> {
        self.query(Domain::Simulation, VAR_NET_BOUNDING_BOX, "", &[], |ty, r| {
            match ty {
                TYPE_POLYGON => {
                    let corners = r.read_u8()?;
                    if corners < 2 {
                        return Err(TraciError::Malformed(format!(
                            "bounding box with {corners} corners"
                        )));
                    }
                    let lower_left = PlanarPoint::new(r.read_f64()?, r.read_f64()?);
                    let upper_right = PlanarPoint::new(r.read_f64()?, r.read_f64()?);
                    Ok(Boundary::new(lower_left, upper_right))
                }
                TYPE_BOUNDINGBOX => {
                    let lower_left = PlanarPoint::new(r.read_f64()?, r.read_f64()?);
                    let upper_right = PlanarPoint::new(r.read_f64()?, r.read_f64()?);
                    Ok(Boundary::new(lower_left, upper_right))
                }
                other => Err(TraciError::UnexpectedType { expected: TYPE_POLYGON, got: other }),
            }
        })
    }

    fn to_geo(&mut self, point: PlanarPoint) -> TraciResult<GeoPoint> {
        let mut params = WireWriter::new();
        params
            .write_u8(TYPE_COMPOUND)
            .write_i32(2)
            .write_u8(POSITION_2D)
            .write_f64(point.x)
            .write_f64(point.y)
            .write_u8(TYPE_UBYTE)
            .write_u8(POSITION_LON_LAT);

        self.query(Domain::Simulation, POSITION_CONVERSION, "", params.as_slice(), |ty, r| {
            expect_type(ty, POSITION_LON_LAT)?;
            let lon = r.read_f64()?;
            let lat = r.read_f64()?;
            Ok(GeoPoint::new(lat, lon))
        })
    }

    fn close(&mut self) -> TraciResult<()> {
        let result = self.request(CMD_CLOSE, &[], |_| Ok(()));
        // The stream is gone either way; a failed close must not leave a
        // half-open channel behind.
        self.stream = None;
        result
    }
}
