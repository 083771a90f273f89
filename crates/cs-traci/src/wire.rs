//! Big-endian value codec.
//!
//! Strings are a 4-byte length followed by UTF-8 bytes; string lists are a
//! 4-byte count followed by strings.

use crate::{TraciError, TraciResult};

// ── WireWriter ────────────────────────────────────────────────────────────────

/// Append-only encoder.
#[derive(Default, Debug, Clone)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn write_i32(&mut self, v: i32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn write_f64(&mut self, v: f64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn write_string(&mut self, s: &str) -> &mut Self {
        self.write_i32(s.len() as i32);
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    pub fn write_string_list<S: AsRef<str>>(&mut self, items: &[S]) -> &mut Self {
        self.write_i32(items.len() as i32);
        for s in items {
            self.write_string(s.as_ref());
        }
        self
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ── WireReader ────────────────────────────────────────────────────────────────

/// Cursor-style decoder over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> TraciResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(TraciError::Truncated { needed: n, available: self.remaining() });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> TraciResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i32(&mut self) -> TraciResult<i32> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_f64(&mut self) -> TraciResult<f64> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(f64::from_be_bytes(raw))
    }

    /// Read a non-negative length or count field.
    fn read_len(&mut self) -> TraciResult<usize> {
        let n = self.read_i32()?;
        usize::try_from(n).map_err(|_| TraciError::Malformed(format!("negative length {n}")))
    }

    pub fn read_string(&mut self) -> TraciResult<String> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| TraciError::InvalidUtf8)
    }

    pub fn read_string_list(&mut self) -> TraciResult<Vec<String>> {
        let count = self.read_len()?;
        // Each string needs at least its 4-byte length prefix.
        if count > self.remaining() / 4 {
            return Err(TraciError::Truncated { needed: count * 4, available: self.remaining() });
        }
        (0..count).map(|_| self.read_string()).collect()
    }
}
