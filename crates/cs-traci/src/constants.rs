//! Protocol constants.

// ── Commands ──────────────────────────────────────────────────────────────────

pub const CMD_GETVERSION: u8 = 0x00;
pub const CMD_SIMSTEP: u8 = 0x02;
pub const CMD_CLOSE: u8 = 0x7F;

pub const CMD_GET_VEHICLE_VARIABLE: u8 = 0xa4;
pub const RESPONSE_GET_VEHICLE_VARIABLE: u8 = 0xb4;

pub const CMD_GET_SIM_VARIABLE: u8 = 0xab;
pub const RESPONSE_GET_SIM_VARIABLE: u8 = 0xcb;

// ── Variables ─────────────────────────────────────────────────────────────────

pub const VAR_SPEED: u8 = 0x40;
pub const VAR_POSITION: u8 = 0x42;
pub const VAR_ANGLE: u8 = 0x43;

/// Vehicles that entered the network during the last step.
pub const VAR_DEPARTED_VEHICLES_IDS: u8 = 0x74;
/// Vehicles that left the network during the last step.
pub const VAR_ARRIVED_VEHICLES_IDS: u8 = 0x7a;
pub const VAR_NET_BOUNDING_BOX: u8 = 0x7c;
pub const POSITION_CONVERSION: u8 = 0x82;

// ── Value types ───────────────────────────────────────────────────────────────

pub const POSITION_LON_LAT: u8 = 0x00;
pub const POSITION_2D: u8 = 0x01;
pub const TYPE_BOUNDINGBOX: u8 = 0x05;
pub const TYPE_POLYGON: u8 = 0x06;
pub const TYPE_UBYTE: u8 = 0x07;
pub const TYPE_DOUBLE: u8 = 0x0B;
pub const TYPE_STRINGLIST: u8 = 0x0E;
pub const TYPE_COMPOUND: u8 = 0x0F;

// ── Status codes ──────────────────────────────────────────────────────────────

pub const RTYPE_OK: u8 = 0x00;
pub const RTYPE_NOTIMPLEMENTED: u8 = 0x01;
pub const RTYPE_ERR: u8 = 0xFF;

/// Upper bound on an incoming message.  Guards against a corrupt length
/// prefix turning into a huge allocation.
pub const MAX_MESSAGE_LEN: usize = 64 * 1024 * 1024;
