//! Legacy Hixie-draft framing (pre-standardization WebSocket).
//!
//! Two frame forms exist. Text frames are sentinel-terminated: a `0x00`
//! type byte, UTF-8 payload, `0xFF` terminator, no length on the wire.
//! Frames whose type byte has the high bit set are length-prefixed: the
//! type byte, a 7-bits-per-byte big-endian length, then the raw payload.
//! A `0xFF` type with length zero is the legacy closing handshake.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::protocol::length::{decode_hixie_length, encode_hixie_length};

const TEXT_FRAME: u8 = 0x00;
const TEXT_TERMINATOR: u8 = 0xFF;
const BINARY_FRAME: u8 = 0x80;
const CLOSE_FRAME: u8 = 0xFF;

/// Streaming decoder for the legacy framing.
///
/// Same external contract as the RFC 6455 decoder: feed arbitrary chunks,
/// get complete messages, with unconsumed bytes retained across calls. The
/// terminator scan for text frames is incremental, so a frame spanning
/// many chunks is scanned once, and the size limit trips partway through a
/// chunk as soon as the scanned payload exceeds it.
pub struct HixieDecoder {
    config: Config,
    buf: BytesMut,
    /// Payload bytes of the current text frame already scanned for the
    /// terminator.
    scanned: usize,
}

impl HixieDecoder {
    /// Create a decoder for one connection.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            buf: BytesMut::new(),
            scanned: 0,
        }
    }

    /// Consume an input chunk and return the messages it completes.
    ///
    /// # Errors
    ///
    /// Any non-[incomplete](Error::is_incomplete) decode error; fatal to
    /// the connection.
    pub fn decode(&mut self, input: &[u8]) -> Result<Vec<Message>> {
        self.buf.extend_from_slice(input);

        let mut messages = Vec::new();
        loop {
            let Some(&frame_type) = self.buf.first() else {
                break;
            };
            if frame_type & 0x80 != 0 {
                match self.decode_length_prefixed(frame_type)? {
                    Some(message) => messages.push(message),
                    None => break,
                }
            } else {
                if frame_type != TEXT_FRAME {
                    return Err(Error::UnknownFrameType(frame_type));
                }
                match self.decode_text()? {
                    Some(message) => messages.push(message),
                    None => break,
                }
            }
        }
        Ok(messages)
    }

    /// Bytes buffered but not yet decoded.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }

    fn decode_length_prefixed(&mut self, frame_type: u8) -> Result<Option<Message>> {
        let (len, len_bytes) = match decode_hixie_length(&self.buf[1..]) {
            Ok(decoded) => decoded,
            Err(e) if e.is_incomplete() => return Ok(None),
            Err(e) => return Err(e),
        };
        // The length is known before the payload: fail here, not after
        // buffering it.
        self.config.check_message_size(len)?;
        let Ok(payload_len) = usize::try_from(len) else {
            return Err(Error::PayloadTooLargeForPlatform { size: len });
        };

        if frame_type == CLOSE_FRAME && payload_len == 0 {
            self.buf.advance(1 + len_bytes);
            trace!("legacy close handshake decoded");
            return Ok(Some(Message::Close(None)));
        }

        if self.buf.len() < 1 + len_bytes + payload_len {
            return Ok(None);
        }
        self.buf.advance(1 + len_bytes);
        let payload = self.buf.split_to(payload_len).freeze();
        trace!(len = payload_len, "legacy binary frame decoded");
        Ok(Some(Message::Binary {
            data: payload,
            fin: true,
        }))
    }

    fn decode_text(&mut self) -> Result<Option<Message>> {
        let scan_from = 1 + self.scanned;
        match self.buf[scan_from..]
            .iter()
            .position(|&b| b == TEXT_TERMINATOR)
        {
            Some(offset) => {
                let payload_len = self.scanned + offset;
                self.config.check_message_size(payload_len as u64)?;
                self.scanned = 0;
                self.buf.advance(1);
                let payload = self.buf.split_to(payload_len).freeze();
                self.buf.advance(1); // terminator
                trace!(len = payload_len, "legacy text frame decoded");
                Ok(Some(Message::Text {
                    data: payload,
                    fin: true,
                }))
            }
            None => {
                // Everything after the type byte has been scanned; remember
                // that so the next chunk resumes where this one stopped,
                // and fail mid-stream once the unterminated payload is
                // already over the limit.
                self.scanned = self.buf.len() - 1;
                self.config.check_message_size(self.scanned as u64)?;
                Ok(None)
            }
        }
    }
}

/// Encoder for the legacy framing.
///
/// Only complete text and binary messages (and the close handshake) exist
/// in this wire format; fragments and ping/pong have no encoding and are
/// rejected.
#[derive(Debug, Default)]
pub struct HixieEncoder;

impl HixieEncoder {
    /// Create an encoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Encode one message into contiguous wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFrame`] for messages this framing cannot
    /// carry: fragments, ping/pong, or text containing the `0xFF`
    /// terminator byte.
    pub fn encode(&self, message: &Message) -> Result<Bytes> {
        let mut out = BytesMut::new();
        self.encode_into(message, &mut out)?;
        Ok(out.freeze())
    }

    /// Encode one message, appending to `out`.
    ///
    /// # Errors
    ///
    /// Same as [`encode`](Self::encode).
    pub fn encode_into(&self, message: &Message, out: &mut BytesMut) -> Result<()> {
        match message {
            Message::Text { data, fin: true } => {
                if data.contains(&TEXT_TERMINATOR) {
                    return Err(Error::InvalidFrame(
                        "text payload contains the 0xff terminator".into(),
                    ));
                }
                out.reserve(data.len() + 2);
                out.put_u8(TEXT_FRAME);
                out.put_slice(data);
                out.put_u8(TEXT_TERMINATOR);
                Ok(())
            }
            Message::Binary { data, fin: true } => {
                out.reserve(data.len() + 11);
                out.put_u8(BINARY_FRAME);
                encode_hixie_length(out, data.len() as u64);
                out.put_slice(data);
                Ok(())
            }
            Message::Close(_) => {
                out.put_u8(CLOSE_FRAME);
                out.put_u8(0x00);
                Ok(())
            }
            _ => Err(Error::InvalidFrame(
                "message not representable in legacy framing".into(),
            )),
        }
    }
}
