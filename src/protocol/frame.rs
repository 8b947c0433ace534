//! RFC 6455 frame headers and wire-level serialization.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |                 Masking key (if MASK set)                     |
//! +---------------------------------------------------------------+
//! |                     Payload data                              |
//! +---------------------------------------------------------------+
//! ```

use bytes::{BufMut, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::length::{decode_payload_length, encode_payload_length};
use crate::protocol::mask::apply_mask;
use crate::protocol::opcode::OpCode;

/// Maximum payload of a control frame (RFC 6455 Section 5.5).
pub const MAX_CONTROL_PAYLOAD: usize = 125;

/// The fixed-size part of a frame: everything known before the payload.
///
/// Parsed from the front of the receive buffer without consuming it, so a
/// decoder can fail fast on header-level violations and then wait for the
/// payload only once the header is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Final-fragment flag.
    pub fin: bool,
    /// Frame opcode.
    pub opcode: OpCode,
    /// Masking key, when the MASK bit is set.
    pub mask: Option<[u8; 4]>,
    /// Declared payload length.
    pub payload_len: u64,
    /// Total header size in bytes, including any masking key.
    pub header_len: usize,
}

impl FrameHeader {
    /// Parse a header from the front of `buf`.
    ///
    /// RSV bits are ignored: no extension that assigns them a meaning is
    /// negotiated at this layer.
    ///
    /// # Errors
    ///
    /// - [`Error::Incomplete`] if `buf` does not yet hold the whole header.
    /// - [`Error::ReservedOpcode`] for reserved opcode values.
    /// - [`Error::InvalidFrame`] for a 64-bit length with its top bit set.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let Some(&first) = buf.first() else {
            return Err(Error::Incomplete { needed: 2 });
        };
        let fin = first & 0x80 != 0;
        let opcode = OpCode::from_u8(first & 0x0F)?;

        let length = decode_payload_length(&buf[1..])?;
        let mut header_len = 1 + length.consumed;

        let mask = if length.masked {
            if buf.len() < header_len + 4 {
                return Err(Error::Incomplete {
                    needed: header_len + 4 - buf.len(),
                });
            }
            let key = [
                buf[header_len],
                buf[header_len + 1],
                buf[header_len + 2],
                buf[header_len + 3],
            ];
            header_len += 4;
            Some(key)
        } else {
            None
        };

        Ok(FrameHeader {
            fin,
            opcode,
            mask,
            payload_len: length.len,
            header_len,
        })
    }

    /// Header-only protocol checks: everything that must fail before the
    /// payload arrives.
    ///
    /// # Errors
    ///
    /// - [`Error::FragmentedControlFrame`] for a control frame with FIN=0.
    /// - [`Error::ControlFrameTooLarge`] for a control payload over 125
    ///   bytes.
    pub fn validate(&self) -> Result<()> {
        if self.opcode.is_control() {
            if !self.fin {
                return Err(Error::FragmentedControlFrame);
            }
            if self.payload_len > MAX_CONTROL_PAYLOAD as u64 {
                return Err(Error::ControlFrameTooLarge(self.payload_len as usize));
            }
        }
        Ok(())
    }
}

/// Serialize one frame into `out`.
///
/// When `mask` is set, the key is written after the length field and the
/// payload is masked in the output buffer; the caller's payload slice is
/// left untouched.
pub fn write_frame(
    out: &mut BytesMut,
    fin: bool,
    opcode: OpCode,
    payload: &[u8],
    mask: Option<[u8; 4]>,
) {
    // Worst-case header is 14 bytes: flags + 64-bit length + key.
    out.reserve(14 + payload.len());

    let mut first = opcode.as_u8();
    if fin {
        first |= 0x80;
    }
    out.put_u8(first);
    encode_payload_length(out, payload.len() as u64, mask.is_some());

    match mask {
        Some(key) => {
            out.put_slice(&key);
            let start = out.len();
            out.put_slice(payload);
            apply_mask(&mut out[start..], key);
        }
        None => out.put_slice(payload),
    }
}
