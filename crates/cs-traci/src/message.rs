//! Request framing and response parsing.

use std::io::{Read, Write};

use crate::constants::{MAX_MESSAGE_LEN, RTYPE_ERR, RTYPE_NOTIMPLEMENTED, RTYPE_OK};
use crate::{TraciError, TraciResult, WireReader, WireWriter};

// ── Outgoing ──────────────────────────────────────────────────────────────────

/// Append one command (`id` + `payload`) with the short or extended length
/// header, whichever fits.
pub fn encode_command(w: &mut WireWriter, id: u8, payload: &[u8]) {
    let short_len = 1 + 1 + payload.len();
    if short_len <= u8::MAX as usize {
        w.write_u8(short_len as u8);
    } else {
        w.write_u8(0);
        w.write_i32((1 + 4 + 1 + payload.len()) as i32);
    }
    w.write_u8(id).write_bytes(payload);
}

/// A complete request message holding a single command.
pub fn frame_request(id: u8, payload: &[u8]) -> Vec<u8> {
    let mut cmd = WireWriter::new();
    encode_command(&mut cmd, id, payload);

    let mut msg = WireWriter::new();
    msg.write_i32((4 + cmd.len()) as i32).write_bytes(cmd.as_slice());
    msg.into_bytes()
}

/// Payload of a "get variable" command: variable id, object id, and any
/// extra typed parameters.
pub fn get_variable_payload(variable: u8, object: &str, params: &[u8]) -> Vec<u8> {
    let mut w = WireWriter::new();
    w.write_u8(variable).write_string(object).write_bytes(params);
    w.into_bytes()
}

pub fn write_message<W: Write>(stream: &mut W, message: &[u8]) -> TraciResult<()> {
    stream.write_all(message)?;
    stream.flush()?;
    Ok(())
}

// ── Incoming ──────────────────────────────────────────────────────────────────

/// Read one length-prefixed message and return its body (prefix stripped).
pub fn read_message<R: Read>(stream: &mut R) -> TraciResult<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes)?;
    let total = i32::from_be_bytes(len_bytes);

    let body_len = usize::try_from(total)
        .ok()
        .and_then(|t| t.checked_sub(4))
        .ok_or_else(|| TraciError::Malformed(format!("message length {total}")))?;
    if body_len > MAX_MESSAGE_LEN {
        return Err(TraciError::Malformed(format!("message length {total} exceeds limit")));
    }

    let mut body = vec![0u8; body_len];
    stream.read_exact(&mut body)?;
    Ok(body)
}

/// Read a command header and check its id.  Returns the number of payload
/// bytes that follow the id.
pub fn read_command_header(r: &mut WireReader<'_>, expected: u8) -> TraciResult<usize> {
    let start = r.position();
    let mut len = r.read_u8()? as usize;
    if len == 0 {
        len = usize::try_from(r.read_i32()?)
            .map_err(|_| TraciError::Malformed("negative extended command length".into()))?;
    }
    let id = r.read_u8()?;
    if id != expected {
        return Err(TraciError::UnexpectedCommand { expected, got: id });
    }
    let header = r.position() - start;
    len.checked_sub(header)
        .ok_or_else(|| TraciError::Malformed(format!("command length {len} shorter than header")))
}

/// Parse the status command that opens every response.
///
/// Non-OK results become [`TraciError::CommandFailed`] carrying the
/// simulator's description.
pub fn check_status(r: &mut WireReader<'_>, command: u8) -> TraciResult<()> {
    let start = r.position();
    let mut len = r.read_u8()? as usize;
    if len == 0 {
        len = usize::try_from(r.read_i32()?)
            .map_err(|_| TraciError::Malformed("negative extended status length".into()))?;
    }
    let id = r.read_u8()?;
    if id != command {
        return Err(TraciError::UnexpectedCommand { expected: command, got: id });
    }
    let status = r.read_u8()?;
    let description = r.read_string()?;
    if r.position() - start != len {
        return Err(TraciError::Malformed(format!(
            "status length {len} does not match {} bytes read",
            r.position() - start
        )));
    }

    match status {
        RTYPE_OK => Ok(()),
        _ => Err(TraciError::CommandFailed { command, status, description }),
    }
}

/// Human-readable name for a status byte, for log lines.
pub fn status_name(status: u8) -> &'static str {
    match status {
        RTYPE_OK             => "ok",
        RTYPE_NOTIMPLEMENTED => "not implemented",
        RTYPE_ERR            => "error",
        _                    => "unknown",
    }
}
