//! Incremental RFC 6455 framing: streaming decoder, masking encoder, and
//! the encode-once shared message cache.
//!
//! Both halves are sans-io: the decoder is fed raw byte chunks as the
//! transport receives them, the encoder hands back wire bytes for the
//! transport to write. One instance of each per connection.

use std::sync::{Arc, OnceLock};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::message::{CloseCode, CloseFrame, Kind, Message};
use crate::protocol::frame::{FrameHeader, MAX_CONTROL_PAYLOAD, write_frame};
use crate::protocol::mask::apply_mask;
use crate::protocol::opcode::OpCode;

/// Streaming frame decoder.
///
/// Feed it input chunks of any size; it buffers what it cannot yet decode
/// and emits one [`Message`] per complete frame. Header-level violations
/// (reserved opcodes, masking-policy mismatches, control-frame rules,
/// oversized messages) fail before the offending payload is received.
pub struct FrameDecoder {
    config: Config,
    buf: BytesMut,
    /// Kind of the fragmented message currently open, if any.
    fragmented: Option<Kind>,
    /// Payload bytes already accumulated toward the open logical message.
    message_total: u64,
}

impl FrameDecoder {
    /// Create a decoder for one connection.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            buf: BytesMut::new(),
            fragmented: None,
            message_total: 0,
        }
    }

    /// Consume an input chunk and return the messages it completes.
    ///
    /// Decoding is resumable: bytes that do not yet form a whole frame are
    /// retained and picked up on the next call, so input may be split at
    /// any byte boundary.
    ///
    /// # Errors
    ///
    /// Any non-[incomplete](Error::is_incomplete) decode error. Errors are
    /// fatal to the connection; the decoder must not be fed again after
    /// one.
    pub fn decode(&mut self, input: &[u8]) -> Result<Vec<Message>> {
        self.buf.extend_from_slice(input);

        let mut messages = Vec::new();
        loop {
            let header = match FrameHeader::parse(&self.buf) {
                Ok(header) => header,
                Err(e) if e.is_incomplete() => break,
                Err(e) => return Err(e),
            };
            self.check_header(&header)?;

            let frame_len = (header.header_len as u64).saturating_add(header.payload_len);
            let Ok(frame_len) = usize::try_from(frame_len) else {
                return Err(Error::PayloadTooLargeForPlatform {
                    size: header.payload_len,
                });
            };
            if self.buf.len() < frame_len {
                // Header accepted; wait for the payload.
                break;
            }

            self.buf.advance(header.header_len);
            let mut payload = self.buf.split_to(header.payload_len as usize);
            if let Some(key) = header.mask {
                apply_mask(&mut payload, key);
            }
            trace!(opcode = ?header.opcode, len = header.payload_len, fin = header.fin, "frame decoded");
            messages.push(self.emit(&header, payload.freeze())?);
        }
        Ok(messages)
    }

    /// Bytes buffered but not yet decoded.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Header-only checks, run before any payload byte is waited for.
    fn check_header(&self, header: &FrameHeader) -> Result<()> {
        if self.config.masking_required && header.mask.is_none() {
            return Err(Error::ExpectedMaskedFrame);
        }
        if !self.config.masking_required && header.mask.is_some() {
            return Err(Error::UnexpectedMaskedFrame);
        }
        header.validate()?;
        if header.opcode.is_data() {
            let projected = self.message_total.saturating_add(header.payload_len);
            self.config.check_message_size(projected)?;
        }
        Ok(())
    }

    fn emit(&mut self, header: &FrameHeader, payload: Bytes) -> Result<Message> {
        match header.opcode {
            OpCode::Text | OpCode::Binary => {
                if self.fragmented.is_some() {
                    return Err(Error::ProtocolViolation(
                        "data frame while a fragmented message is open".into(),
                    ));
                }
                let kind = if header.opcode == OpCode::Text {
                    Kind::Text
                } else {
                    Kind::Binary
                };
                if header.fin {
                    self.message_total = 0;
                } else {
                    self.fragmented = Some(kind);
                    self.message_total = payload.len() as u64;
                }
                Ok(match kind {
                    Kind::Text => Message::Text {
                        data: payload,
                        fin: header.fin,
                    },
                    Kind::Binary => Message::Binary {
                        data: payload,
                        fin: header.fin,
                    },
                })
            }
            OpCode::Continuation => {
                if self.fragmented.is_none() {
                    return Err(Error::ProtocolViolation(
                        "continuation frame without a message to continue".into(),
                    ));
                }
                if header.fin {
                    self.fragmented = None;
                    self.message_total = 0;
                } else {
                    self.message_total += payload.len() as u64;
                }
                Ok(Message::Continuation {
                    data: payload,
                    fin: header.fin,
                })
            }
            OpCode::Ping => Ok(Message::Ping(payload)),
            OpCode::Pong => Ok(Message::Pong(payload)),
            OpCode::Close => decode_close(&payload),
        }
    }
}

fn decode_close(payload: &Bytes) -> Result<Message> {
    if payload.is_empty() {
        return Ok(Message::Close(None));
    }
    if payload.len() < 2 {
        return Err(Error::ProtocolViolation(
            "close payload shorter than a status code".into(),
        ));
    }
    let code = CloseCode::from_u16(u16::from_be_bytes([payload[0], payload[1]]));
    let reason = std::str::from_utf8(&payload[2..])
        .map_err(|_| Error::InvalidUtf8)?
        .to_owned();
    Ok(Message::Close(Some(CloseFrame { code, reason })))
}

fn close_payload(frame: Option<&CloseFrame>) -> Bytes {
    match frame {
        None => Bytes::new(),
        Some(frame) => {
            let mut out = BytesMut::with_capacity(2 + frame.reason.len());
            out.put_u16(frame.code.as_u16());
            out.put_slice(frame.reason.as_bytes());
            out.freeze()
        }
    }
}

/// Opcode, FIN flag and payload for one outgoing frame.
///
/// Continuation messages keep opcode 0x0 no matter which kind of message
/// they continue; the close payload is built from its structured form.
fn frame_parts(message: &Message) -> (bool, OpCode, Bytes) {
    match message {
        Message::Text { data, fin } => (*fin, OpCode::Text, data.clone()),
        Message::Binary { data, fin } => (*fin, OpCode::Binary, data.clone()),
        Message::Continuation { data, fin } => (*fin, OpCode::Continuation, data.clone()),
        Message::Ping(data) => (true, OpCode::Ping, data.clone()),
        Message::Pong(data) => (true, OpCode::Pong, data.clone()),
        Message::Close(frame) => (true, OpCode::Close, close_payload(frame.as_ref())),
    }
}

fn check_control_payload(opcode: OpCode, payload: &[u8]) -> Result<()> {
    if opcode.is_control() && payload.len() > MAX_CONTROL_PAYLOAD {
        return Err(Error::ControlFrameTooLarge(payload.len()));
    }
    Ok(())
}

/// Seed for the outgoing mask sequence; system time as a fallback when the
/// OS entropy source is unavailable.
fn random_mask_seed() -> u32 {
    let mut seed = [0u8; 4];
    if getrandom::getrandom(&mut seed).is_ok() {
        u32::from_le_bytes(seed)
    } else {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u32)
            .unwrap_or(0x6b8b_4567)
    }
}

/// Streaming frame encoder.
///
/// Serializes messages into wire frames, masking them when configured for
/// client-role framing. One instance per connection; the mask sequence is
/// seeded per instance.
pub struct FrameEncoder {
    mask_outgoing: bool,
    mask_counter: u32,
}

impl FrameEncoder {
    /// Create an encoder for one connection.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            mask_outgoing: config.mask_outgoing,
            mask_counter: random_mask_seed(),
        }
    }

    /// Whether this encoder masks outgoing frames.
    #[must_use]
    pub const fn masking(&self) -> bool {
        self.mask_outgoing
    }

    /// Weyl sequence through a 32-bit mix; cheap and well distributed.
    fn next_mask(&mut self) -> [u8; 4] {
        self.mask_counter = self.mask_counter.wrapping_add(0x9E37_79B9);
        let mut x = self.mask_counter;
        x = x.wrapping_mul(0x85EB_CA6B);
        x ^= x >> 13;
        x = x.wrapping_mul(0xC2B2_AE35);
        x.to_le_bytes()
    }

    /// Encode one message into contiguous wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControlFrameTooLarge`] for a control payload over
    /// 125 bytes.
    pub fn encode(&mut self, message: &Message) -> Result<Bytes> {
        let mut out = BytesMut::new();
        self.encode_into(message, &mut out)?;
        Ok(out.freeze())
    }

    /// Encode one message, appending to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControlFrameTooLarge`] for a control payload over
    /// 125 bytes.
    pub fn encode_into(&mut self, message: &Message, out: &mut BytesMut) -> Result<()> {
        let (fin, opcode, payload) = frame_parts(message);
        check_control_payload(opcode, &payload)?;
        let mask = self.mask_outgoing.then(|| self.next_mask());
        write_frame(out, fin, opcode, &payload, mask);
        Ok(())
    }

    /// Encode one message as a `(header, payload)` pair.
    ///
    /// Concatenating the two parts yields exactly the bytes of
    /// [`encode`](Self::encode). When no masking is applied, the payload
    /// half shares the message's backing storage instead of copying it, so
    /// large broadcasts can be written vectored without duplication.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControlFrameTooLarge`] for a control payload over
    /// 125 bytes.
    pub fn encode_vectored(&mut self, message: &Message) -> Result<(Bytes, Bytes)> {
        let (fin, opcode, payload) = frame_parts(message);
        check_control_payload(opcode, &payload)?;

        let mut header = BytesMut::new();
        let mut first = opcode.as_u8();
        if fin {
            first |= 0x80;
        }
        header.put_u8(first);
        crate::protocol::length::encode_payload_length(
            &mut header,
            payload.len() as u64,
            self.mask_outgoing,
        );

        if self.mask_outgoing {
            let key = self.next_mask();
            header.put_slice(&key);
            let mut masked = BytesMut::from(payload.as_ref());
            apply_mask(&mut masked, key);
            Ok((header.freeze(), masked.freeze()))
        } else {
            Ok((header.freeze(), payload))
        }
    }

    /// Encode a shared message, reusing its cached wire bytes.
    ///
    /// Masking encoders fall back to a fresh per-connection encode, since
    /// masked output differs per frame by construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControlFrameTooLarge`] for a control payload over
    /// 125 bytes.
    pub fn encode_shared(&mut self, message: &SharedMessage) -> Result<Bytes> {
        if self.mask_outgoing {
            self.encode(message.message())
        } else {
            message.wire_bytes()
        }
    }
}

/// A message whose unmasked wire encoding is computed once and then read
/// by any number of sessions.
///
/// The cache is write-once: the first caller encodes, every later caller
/// (on any thread) gets the same immutable bytes. Cloning shares the
/// cache.
#[derive(Debug, Clone)]
pub struct SharedMessage {
    inner: Arc<SharedInner>,
}

#[derive(Debug)]
struct SharedInner {
    message: Message,
    wire: OnceLock<Bytes>,
}

impl SharedMessage {
    /// Wrap a message for shared encoding.
    #[must_use]
    pub fn new(message: Message) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                message,
                wire: OnceLock::new(),
            }),
        }
    }

    /// The wrapped message.
    #[must_use]
    pub fn message(&self) -> &Message {
        &self.inner.message
    }

    /// Whether the wire bytes have been computed yet.
    #[must_use]
    pub fn is_encoded(&self) -> bool {
        self.inner.wire.get().is_some()
    }

    /// Unmasked wire bytes, encoded on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControlFrameTooLarge`] for a control payload over
    /// 125 bytes.
    pub fn wire_bytes(&self) -> Result<Bytes> {
        if let Some(bytes) = self.inner.wire.get() {
            return Ok(bytes.clone());
        }
        let (fin, opcode, payload) = frame_parts(&self.inner.message);
        check_control_payload(opcode, &payload)?;
        let mut out = BytesMut::new();
        write_frame(&mut out, fin, opcode, &payload, None);
        // A racing writer computed identical bytes; keep whichever landed.
        Ok(self.inner.wire.get_or_init(|| out.freeze()).clone())
    }
}

impl From<Message> for SharedMessage {
    fn from(message: Message) -> Self {
        Self::new(message)
    }
}
