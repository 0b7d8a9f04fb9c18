//! Binary frame format for the CAS broker protocol.
//!
//! Frame layout (8-byte prefix + body):
//!
//! ```text
//! +-------------+----------+-------------------+
//! | body length | CAS info | body              |
//! |  4 bytes BE | 4 bytes  | length bytes      |
//! +-------------+----------+-------------------+
//! ```
//!
//! The length field counts the body only, not itself nor the CAS info.
//! A few fixed-layout responses under-declare the length; the reader
//! compensates with a per-packet minimum body size (see
//! [`FrameReader::take_frame`]).

use crate::error::ProtocolError;
use crate::{CAS_INFO_SIZE, FRAME_PREFIX_SIZE, MAX_BODY_SIZE};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Minimum body of an error response: response code + error code.
/// The message tail may be absent entirely when empty.
const ERROR_BODY_MIN: usize = 8;

/// Accumulates a request body, then finalizes it into a framed buffer.
#[derive(Debug, Default)]
pub struct FrameWriter {
    body: BytesMut,
}

impl FrameWriter {
    pub fn new() -> Self {
        Self {
            body: BytesMut::with_capacity(256),
        }
    }

    /// Writes a signed 32-bit big-endian integer.
    pub fn write_int(&mut self, value: i32) {
        self.body.put_i32(value);
    }

    /// Writes a single byte.
    pub fn write_byte(&mut self, value: u8) {
        self.body.put_u8(value);
    }

    /// Writes a string truncated or zero-padded to exactly `len` bytes.
    pub fn write_fixed_str(&mut self, value: &str, len: usize) {
        let bytes = value.as_bytes();
        let n = bytes.len().min(len);
        self.body.put_slice(&bytes[..n]);
        self.body.put_bytes(0, len - n);
    }

    /// Writes a null-terminated string.
    pub fn write_cstr(&mut self, value: &str) {
        self.body.put_slice(value.as_bytes());
        self.body.put_u8(0);
    }

    /// Writes `len` filler bytes of `value`.
    pub fn write_filler(&mut self, len: usize, value: u8) {
        self.body.put_bytes(value, len);
    }

    /// Writes a raw byte block.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.body.put_slice(data);
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Finalizes into an immutable framed buffer: length prefix, CAS info
    /// echo, body.
    pub fn finish(self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut out = BytesMut::with_capacity(FRAME_PREFIX_SIZE + self.body.len());
        out.put_i32(self.body.len() as i32);
        out.put_slice(&cas_info);
        out.put_slice(&self.body);
        out.freeze()
    }
}

/// A reassembled frame: the CAS info prefix and the body bytes.
#[derive(Debug, Clone)]
pub struct Frame {
    /// CAS info token echoed on this frame.
    pub cas_info: [u8; CAS_INFO_SIZE],
    /// Body length as declared on the wire.
    pub declared_len: usize,
    /// Assembled body (at least `declared_len` bytes).
    pub body: Bytes,
}

impl Frame {
    pub fn cursor(&self) -> FrameCursor<'_> {
        FrameCursor::new(&self.body)
    }
}

/// Reassembles frames from arbitrary-sized stream chunks.
///
/// TCP is a stream, not a message transport: chunks are buffered until a
/// complete frame is present. Buffered bytes are never discarded until the
/// consumer takes the frame.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: BytesMut,
}

impl FrameReader {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(8192),
        }
    }

    /// Appends a stream chunk to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Returns whether a complete frame is buffered for a packet whose
    /// success body is at least `min_body` bytes.
    pub fn has_frame(&self, min_body: usize) -> Result<bool, ProtocolError> {
        Ok(self.frame_body_len(min_body)?.is_some())
    }

    /// Takes the next complete frame, or `None` when more bytes are needed.
    ///
    /// `min_body` is the packet's fixed minimum success-body size. The
    /// effective body is `max(declared, min_body)` for success frames; error
    /// frames only require their code tail. This is what lets fixed-layout
    /// responses under-declare the length field.
    pub fn take_frame(&mut self, min_body: usize) -> Result<Option<Frame>, ProtocolError> {
        let body_len = match self.frame_body_len(min_body)? {
            Some(n) => n,
            None => return Ok(None),
        };
        let declared = i32::from_be_bytes(self.buf[0..4].try_into().unwrap()) as usize;
        self.buf.advance(4);
        let mut cas_info = [0u8; CAS_INFO_SIZE];
        cas_info.copy_from_slice(&self.buf[..CAS_INFO_SIZE]);
        self.buf.advance(CAS_INFO_SIZE);
        let body = self.buf.split_to(body_len).freeze();
        Ok(Some(Frame {
            cas_info,
            declared_len: declared,
            body,
        }))
    }

    /// Computes the effective body length once enough bytes are buffered.
    fn frame_body_len(&self, min_body: usize) -> Result<Option<usize>, ProtocolError> {
        if self.buf.len() < FRAME_PREFIX_SIZE {
            return Ok(None);
        }
        let declared = i32::from_be_bytes(self.buf[0..4].try_into().unwrap());
        if declared < 0 {
            return Err(ProtocolError::NegativeLength(declared));
        }
        let declared = declared as usize;
        if declared > MAX_BODY_SIZE as usize {
            return Err(ProtocolError::FrameTooLarge {
                size: declared as u32,
                max: MAX_BODY_SIZE,
            });
        }

        let body_len = if declared >= min_body {
            declared
        } else {
            // Under-declared fixed-layout frame: the response code decides
            // whether the fixed success body or the error tail follows.
            if self.buf.len() < FRAME_PREFIX_SIZE + 4 {
                return Ok(None);
            }
            let code = i32::from_be_bytes(
                self.buf[FRAME_PREFIX_SIZE..FRAME_PREFIX_SIZE + 4]
                    .try_into()
                    .unwrap(),
            );
            if code < 0 {
                declared.max(ERROR_BODY_MIN)
            } else {
                declared.max(min_body)
            }
        };

        if self.buf.len() < FRAME_PREFIX_SIZE + body_len {
            return Ok(None);
        }
        Ok(Some(body_len))
    }
}

/// Cursor-style reader over an assembled frame body.
///
/// Mirrors the writer primitives. Position advances only on a successful
/// read.
#[derive(Debug)]
pub struct FrameCursor<'a> {
    buf: &'a [u8],
}

impl<'a> FrameCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Reads a signed 32-bit big-endian integer.
    pub fn read_int(&mut self) -> Result<i32, ProtocolError> {
        let bytes = self.read_blob(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Reads a single byte.
    pub fn read_byte(&mut self) -> Result<u8, ProtocolError> {
        let bytes = self.read_blob(1)?;
        Ok(bytes[0])
    }

    /// Reads a raw block of exactly `len` bytes.
    pub fn read_blob(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        if self.buf.len() < len {
            return Err(ProtocolError::Truncated {
                needed: len - self.buf.len(),
            });
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Reads a fixed-length field, trimming the zero padding.
    pub fn read_fixed_str(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        let raw = self.read_blob(len)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(&raw[..end])
    }

    /// Reads bytes up to (and consuming) a null terminator.
    pub fn read_cstr(&mut self) -> Result<&'a [u8], ProtocolError> {
        let end = self
            .buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(ProtocolError::UnterminatedString)?;
        let head = &self.buf[..end];
        self.buf = &self.buf[end + 1..];
        Ok(head)
    }

    /// Takes everything left in the cursor.
    pub fn take_remaining(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.buf)
    }
}
